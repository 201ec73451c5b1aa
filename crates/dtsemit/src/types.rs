//! Shared type definitions for the dtsemit crate
//!
//! This module contains common types that are used across multiple components
//! of the declaration pipeline, ensuring consistency and avoiding circular dependencies.

/// Classification of an admitted module based on where its content comes from
///
/// This enum represents the fundamental categorization of modules handed to the
/// compiler engine, which decides whether the engine reads the file itself or is
/// given the bundler's content for a synthesized path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    /// A `.ts`/`.tsx` file the compiler engine loads from disk
    StandaloneSource,

    /// The script block of a component file, registered by content under a
    /// synthesized `.ts`/`.js` path
    ExtractedScriptBlock,
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StandaloneSource => write!(f, "source"),
            Self::ExtractedScriptBlock => write!(f, "script-block"),
        }
    }
}

/// Script language of a component script block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptLang {
    TypeScript,
    JavaScript,
}

impl ScriptLang {
    /// Extension appended to the component path to form the logical path
    pub fn logical_extension(self) -> &'static str {
        match self {
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
        }
    }
}
