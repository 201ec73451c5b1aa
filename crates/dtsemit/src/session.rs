//! Build-scoped wrapper around the compiler engine
//!
//! A [`CompilerSession`] accepts registrations while modules are transformed.
//! [`CompilerSession::emit`] consumes it, runs emission exactly once and hands
//! back an [`EmittedSession`] that only answers output queries, so no source
//! can be registered after emission and no output can be read before it.

use std::path::Path;

use anyhow::{Context, Result};
use log::debug;

use crate::{
    engine::{CompilerEngine, Diagnostic, EmittedFile, SourceId},
    project::{ProjectOptions, ProjectOverrides, merge_project_options},
};

#[derive(Debug)]
pub struct CompilerSession<E> {
    engine: E,
}

impl<E: CompilerEngine> CompilerSession<E> {
    /// Build the engine from the merged project options
    pub fn new(root: &Path, overrides: Option<&ProjectOverrides>) -> Result<Self> {
        let options = merge_project_options(root, overrides);
        Self::with_options(options)
    }

    pub fn with_options(options: ProjectOptions) -> Result<Self> {
        debug!(
            "Creating compiler session (tsconfig: {})",
            options.tsconfig_file_path.display()
        );
        let engine = E::with_options(options).context("failed to create compiler engine")?;
        Ok(Self { engine })
    }

    /// Register in-memory content under a logical path
    pub fn register_content(&mut self, logical_path: &Path, text: &str) -> Result<SourceId> {
        self.engine.create_source_file(logical_path, text)
    }

    /// Register a file the engine loads from disk
    pub fn register_path(&mut self, path: &Path) -> Result<SourceId> {
        self.engine.add_source_file_at_path(path)
    }

    /// Diagnostics for reporting; never used to gate emission
    pub fn pre_emit_diagnostics(&mut self) -> Result<Vec<Diagnostic>> {
        self.engine.pre_emit_diagnostics()
    }

    pub fn format_diagnostics(&self, diagnostics: &[Diagnostic]) -> String {
        self.engine.format_diagnostics(diagnostics)
    }

    /// Run emission into memory, closing registrations
    pub fn emit(mut self) -> Result<EmittedSession<E>> {
        self.engine.emit_to_memory()?;
        Ok(EmittedSession {
            engine: self.engine,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// Session after emission: outputs only
#[derive(Debug)]
pub struct EmittedSession<E> {
    engine: E,
}

impl<E: CompilerEngine> EmittedSession<E> {
    pub fn emitted_files(&self, source: SourceId) -> Result<Vec<EmittedFile>> {
        self.engine.emitted_files(source)
    }
}
