//! In-memory compiler engine shared by the integration tests
//!
//! The fake "compiles" a source by keeping its `export` lines. A source without
//! exports emits nothing, and a source containing `@error` yields one error
//! diagnostic. Emission fails loudly when queried out of order.

#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use dtsemit::{
    Config,
    engine::{CompilerEngine, Diagnostic, DiagnosticCategory, EmittedFile, SourceId},
    project::ProjectOptions,
};
use indexmap::IndexMap;

#[derive(Debug)]
pub struct FakeEngine {
    pub options: ProjectOptions,
    pub sources: IndexMap<PathBuf, String>,
    emitted: Option<Vec<Vec<EmittedFile>>>,
}

impl FakeEngine {
    fn register(&mut self, path: &Path, text: String) -> Result<SourceId> {
        if self.emitted.is_some() {
            bail!("{} registered after emission", path.display());
        }
        let (index, _) = self.sources.insert_full(path.to_path_buf(), text);
        Ok(SourceId::new(u32::try_from(index)?))
    }
}

impl CompilerEngine for FakeEngine {
    fn with_options(options: ProjectOptions) -> Result<Self> {
        Ok(Self {
            options,
            sources: IndexMap::new(),
            emitted: None,
        })
    }

    fn create_source_file(&mut self, logical_path: &Path, text: &str) -> Result<SourceId> {
        self.register(logical_path, text.to_owned())
    }

    fn add_source_file_at_path(&mut self, path: &Path) -> Result<SourceId> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("fake engine could not read {}", path.display()))?;
        self.register(path, text)
    }

    fn pre_emit_diagnostics(&mut self) -> Result<Vec<Diagnostic>> {
        Ok(self
            .sources
            .iter()
            .filter(|(_, text)| text.contains("@error"))
            .map(|(path, _)| Diagnostic {
                category: DiagnosticCategory::Error,
                code: 2322,
                message: format!("broken source {}", path.display()),
                location: None,
            })
            .collect())
    }

    fn emit_to_memory(&mut self) -> Result<()> {
        if self.emitted.is_some() {
            bail!("emitted twice");
        }
        let outputs = self
            .sources
            .iter()
            .map(|(path, text)| {
                let exports: Vec<&str> = text
                    .lines()
                    .filter(|line| line.trim_start().starts_with("export "))
                    .collect();
                if exports.is_empty() {
                    return Vec::new();
                }
                vec![EmittedFile {
                    path: declaration_path(path),
                    text: format!("{}\n", exports.join("\n")),
                }]
            })
            .collect();
        self.emitted = Some(outputs);
        Ok(())
    }

    fn emitted_files(&self, source: SourceId) -> Result<Vec<EmittedFile>> {
        let Some(emitted) = &self.emitted else {
            bail!("outputs requested for {source} before emission");
        };
        emitted
            .get(source.as_usize())
            .cloned()
            .with_context(|| format!("unknown {source}"))
    }
}

/// `a.ts` -> `a.d.ts`, `Widget.vue.ts` -> `Widget.vue.d.ts`
pub fn declaration_path(path: &Path) -> PathBuf {
    let name = path.to_string_lossy();
    let stem = [".tsx", ".ts", ".jsx", ".js"]
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(&*name);
    PathBuf::from(format!("{stem}.d.ts"))
}

pub fn config_for(root: &Path) -> Config {
    Config {
        root: root.to_path_buf(),
        ..Config::default()
    }
}

pub fn write_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}
