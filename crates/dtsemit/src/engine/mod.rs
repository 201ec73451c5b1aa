//! Boundary with the type-aware compiler engine
//!
//! The engine is an opaque multi-file compiler: it indexes sources under
//! logical paths, reports diagnostics and emits declaration text per source.
//! [`tsc::TscEngine`] drives the TypeScript compiler; tests plug in their own.

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Result;

use crate::project::ProjectOptions;

pub mod tsc;

pub use tsc::TscEngine;

/// Identifier the engine hands out for a registered source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u32);

impl SourceId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Suggestion => write!(f, "suggestion"),
            Self::Message => write!(f, "message"),
        }
    }
}

/// Location of a diagnostic; line and column are 1-based
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

/// A compiler diagnostic, reported but never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message: String,
    pub location: Option<DiagnosticLocation>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(
                f,
                "{}({},{}): ",
                location.file.display(),
                location.line,
                location.column
            )?;
        }
        write!(f, "{} TS{}: {}", self.category, self.code, self.message)
    }
}

/// One output file produced for a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedFile {
    /// Absolute logical path, next to the source it was emitted for
    pub path: PathBuf,
    pub text: String,
}

/// Multi-file compiler session operations
///
/// Registering the same path twice keeps the most recent registration; callers
/// are expected not to do that.
pub trait CompilerEngine {
    /// Construct an engine around the merged project options
    fn with_options(options: ProjectOptions) -> Result<Self>
    where
        Self: Sized;

    /// Index `text` under `logical_path` without touching the filesystem
    fn create_source_file(&mut self, logical_path: &Path, text: &str) -> Result<SourceId>;

    /// Index the file at `path`, reading it from disk
    fn add_source_file_at_path(&mut self, path: &Path) -> Result<SourceId>;

    /// Diagnostics for everything registered so far
    fn pre_emit_diagnostics(&mut self) -> Result<Vec<Diagnostic>>;

    /// Emit all registered sources into memory
    fn emit_to_memory(&mut self) -> Result<()>;

    /// Files emitted for one source; empty when it produced no declarations
    fn emitted_files(&self, source: SourceId) -> Result<Vec<EmittedFile>>;

    /// Render diagnostics for display
    fn format_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display_with_location() {
        let diagnostic = Diagnostic {
            category: DiagnosticCategory::Error,
            code: 2322,
            message: "Type 'string' is not assignable to type 'number'.".to_owned(),
            location: Some(DiagnosticLocation {
                file: PathBuf::from("/proj/src/a.ts"),
                line: 3,
                column: 7,
            }),
        };
        insta::assert_snapshot!(
            diagnostic.to_string(),
            @"/proj/src/a.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'."
        );
    }

    #[test]
    fn test_diagnostic_display_without_location() {
        let diagnostic = Diagnostic {
            category: DiagnosticCategory::Error,
            code: 5083,
            message: "Cannot read file '/proj/tsconfig.json'.".to_owned(),
            location: None,
        };
        insta::assert_snapshot!(
            diagnostic.to_string(),
            @"error TS5083: Cannot read file '/proj/tsconfig.json'."
        );
    }

    #[test]
    fn test_source_id_display() {
        assert_eq!(SourceId::new(4).to_string(), "source#4");
        assert_eq!(SourceId::new(4).as_usize(), 4);
    }
}
