//! Standalone build driver
//!
//! Replays the bundler lifecycle over files on disk: every discovered source is
//! fed through [`DtsPlugin::transform`] the way a bundler would present it, then
//! the bundle is generated once. Components contribute their combined script
//! block under the bundler's pseudo-module identifier.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use indexmap::IndexSet;
use log::{debug, trace};
use walkdir::{DirEntry, WalkDir};

use crate::{
    config::Config,
    emit::{EmitSummary, OutputOptions},
    engine::{CompilerEngine, TscEngine},
    paths::resolve_against,
    plugin::DtsPlugin,
    sfc,
    sink::OutputSink,
};

/// Extensions picked up when walking a directory
pub const DISCOVERED_EXTENSIONS: [&str; 7] = ["vue", "ts", "tsx", "mts", "cts", "js", "jsx"];

const SKIPPED_DIRECTORIES: [&str; 3] = ["node_modules", ".git", "dist"];

#[derive(Debug)]
pub struct BuildDriver<E = TscEngine> {
    plugin: DtsPlugin<E>,
}

impl<E: CompilerEngine> BuildDriver<E> {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            plugin: DtsPlugin::new(config)?,
        })
    }

    /// Expand inputs into the ordered, de-duplicated list of files to transform
    ///
    /// Files named explicitly are always taken; directories are walked in file
    /// name order and only contribute sources with a known extension.
    pub fn collect_inputs(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let root = &self.plugin.config().root;
        let mut files = IndexSet::new();

        for input in inputs {
            let input = resolve_against(root, input);
            if input.is_file() {
                files.insert(input);
                continue;
            }
            if !input.is_dir() {
                bail!("input {} does not exist", input.display());
            }

            for entry in WalkDir::new(&input)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_skipped_directory(entry))
            {
                let entry = entry.with_context(|| format!("failed to walk {}", input.display()))?;
                if entry.file_type().is_file() && has_discovered_extension(entry.path()) {
                    files.insert(entry.into_path());
                }
            }
        }

        debug!("Collected {} input files", files.len());
        Ok(files.into_iter().collect())
    }

    /// Present one file to the plugin; returns how many modules were admitted
    pub fn transform_file(&mut self, path: &Path) -> Result<usize> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        if path.extension().is_some_and(|extension| extension == "vue") {
            let Some(script) = sfc::extract_script(&source) else {
                trace!("{} has no script block", path.display());
                return Ok(0);
            };
            let id = script.module_id(path);
            return Ok(usize::from(self.plugin.transform(&script.content, &id)?.is_some()));
        }

        let id = path.to_string_lossy();
        Ok(usize::from(self.plugin.transform(&source, &id)?.is_some()))
    }

    /// Transform every input, then generate the bundle once
    pub fn run<S>(mut self, inputs: &[PathBuf], output: &OutputOptions, sink: &mut S) -> Result<EmitSummary>
    where
        S: OutputSink + ?Sized,
    {
        let files = self.collect_inputs(inputs)?;
        let mut admitted = 0;
        for file in &files {
            admitted += self.transform_file(file)?;
        }
        debug!("Admitted {admitted} of {} files", files.len());

        self.plugin.generate_bundle_into(output, sink)
    }
}

fn is_skipped_directory(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRECTORIES.contains(&name))
}

fn has_discovered_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| DISCOVERED_EXTENSIONS.contains(&extension))
}
