//! End-of-build emission and output path remapping
//!
//! Emitted declaration files carry logical paths next to their sources
//! (`<root>/src/Widget.vue.d.ts`). Each one is re-rooted from the project root
//! onto the bundle's output directory, optionally dropping the `.vue` infix from
//! the file name and from quoted `.vue` specifiers in the text.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use anyhow::{Result, bail};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::{
    engine::CompilerEngine,
    module_registry::ModuleRegistry,
    paths::{relative_to, resolve_against},
    session::CompilerSession,
    sink::OutputSink,
    types::ModuleKind,
};

static QUOTED_COMPONENT_SPECIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"'([^'\n]+)\.vue'|"([^"\n]+)\.vue""#).expect("specifier pattern is valid")
});

/// The bundler's resolved output target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Single output file
    pub file: Option<PathBuf>,
    /// Output directory
    pub dir: Option<PathBuf>,
}

impl OutputOptions {
    pub fn dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            file: None,
            dir: Some(dir.into()),
        }
    }

    pub fn file(file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            dir: None,
        }
    }
}

/// Settings the remapper needs from the plugin configuration
#[derive(Debug, Clone, Copy)]
pub struct RemapSettings<'a> {
    pub root: &'a Path,
    pub clean_vue_file_name: bool,
}

/// What one emission pass produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    pub modules: usize,
    pub diagnostics: usize,
    pub written: Vec<PathBuf>,
}

/// Directory declarations are written into: the output file's directory, or
/// the output directory. Relative targets resolve against `root`.
pub fn declaration_dir(output: &OutputOptions, root: &Path) -> Result<PathBuf> {
    let dir = match (&output.file, &output.dir) {
        (Some(file), _) => file.parent().map(Path::to_path_buf).unwrap_or_default(),
        (None, Some(dir)) => dir.clone(),
        (None, None) => bail!("output options name neither an output file nor a directory"),
    };
    Ok(resolve_against(root, dir))
}

/// Drop the `.vue` infix from a declaration file name (`X.vue.d.ts` -> `X.d.ts`)
pub fn clean_component_file_name(path: &Path) -> Cow<'_, Path> {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return Cow::Borrowed(path);
    };

    let cleaned = [".vue.d.ts", ".vue.d.ts.map"].iter().find_map(|suffix| {
        name.strip_suffix(suffix)
            .map(|stem| format!("{stem}{}", &suffix[".vue".len()..]))
    });

    match cleaned {
        Some(cleaned) => Cow::Owned(path.with_file_name(cleaned)),
        None => Cow::Borrowed(path),
    }
}

/// Strip the `.vue` suffix from every quoted specifier, keeping the quotes
pub fn clean_component_imports(text: &str) -> Cow<'_, str> {
    QUOTED_COMPONENT_SPECIFIER.replace_all(text, |captures: &Captures<'_>| {
        if let Some(single) = captures.get(1) {
            format!("'{}'", single.as_str())
        } else {
            format!("\"{}\"", &captures[2])
        }
    })
}

/// Final write target for an emitted file
pub fn remap_output_path(
    emitted: &Path,
    settings: RemapSettings<'_>,
    declaration_dir: &Path,
) -> PathBuf {
    let emitted = if settings.clean_vue_file_name {
        clean_component_file_name(emitted)
    } else {
        Cow::Borrowed(emitted)
    };
    resolve_against(declaration_dir, relative_to(settings.root, &emitted))
}

/// Run the emitting phase: report diagnostics, emit once, remap and write every
/// output of every admitted module
pub fn emit_declarations<E, S>(
    mut session: CompilerSession<E>,
    registry: &ModuleRegistry,
    settings: RemapSettings<'_>,
    output: &OutputOptions,
    sink: &mut S,
) -> Result<EmitSummary>
where
    E: CompilerEngine,
    S: OutputSink + ?Sized,
{
    let declaration_dir = declaration_dir(output, settings.root)?;
    debug!(
        "Writing declarations for {} sources and {} script blocks into {}",
        registry.count_kind(ModuleKind::StandaloneSource),
        registry.count_kind(ModuleKind::ExtractedScriptBlock),
        declaration_dir.display()
    );

    let diagnostics = session.pre_emit_diagnostics()?;
    if !diagnostics.is_empty() {
        warn!("{}", session.format_diagnostics(&diagnostics));
    }

    let emitted = session.emit()?;

    let mut summary = EmitSummary {
        modules: registry.len(),
        diagnostics: diagnostics.len(),
        written: Vec::new(),
    };

    for handle in registry {
        let files = emitted.emitted_files(handle.id)?;
        if files.is_empty() {
            debug!("No declarations for {} ({})", handle.logical_path.display(), handle.kind);
        }

        for file in files {
            let target = remap_output_path(&file.path, settings, &declaration_dir);
            let text = if settings.clean_vue_file_name {
                clean_component_imports(&file.text)
            } else {
                Cow::Borrowed(file.text.as_str())
            };

            debug!("{} -> {}", file.path.display(), target.display());
            sink.write(&target, &text)?;
            summary.written.push(target);
        }
    }

    info!(
        "Emitted {} declaration files for {} modules",
        summary.written.len(),
        summary.modules
    );
    Ok(summary)
}
