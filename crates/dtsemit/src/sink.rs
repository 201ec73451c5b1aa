//! Terminal writers for declaration output

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::info;

/// Destination for final `(path, content)` pairs
pub trait OutputSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()>;
}

/// Writes to disk, creating parent directories and overwriting existing files
#[derive(Debug, Default)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(path, contents)
            .with_context(|| format!("failed to write declaration {}", path.display()))
    }
}

/// Records targets without touching the filesystem
#[derive(Debug, Default)]
pub struct DryRunSink {
    pub written: Vec<(PathBuf, usize)>,
}

impl OutputSink for DryRunSink {
    fn write(&mut self, path: &Path, contents: &str) -> Result<()> {
        info!("Would write {} ({} bytes)", path.display(), contents.len());
        self.written.push((path.to_path_buf(), contents.len()));
        Ok(())
    }
}
