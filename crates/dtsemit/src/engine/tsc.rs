//! Compiler engine backed by the TypeScript `tsc` executable
//!
//! Sources registered by path are compiled in place, so every import they make
//! resolves against the real project. Sources registered by content are written
//! into an overlay tree inside a scratch directory; `rootDirs` merges the overlay
//! with the project root so their relative imports resolve the same way. A
//! generated `tsconfig.json` lists exactly the registered files, the program is
//! compiled once, and the emitted declaration files are read back into memory.
//! The scratch directory lives under `<root>/node_modules` when that directory
//! exists, so bare package imports resolve as they would from the project.

use std::{
    env, fs,
    path::{Component, Path, PathBuf},
    process::Command,
};

use anyhow::{Context, Result, bail};
use indexmap::IndexMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use tempfile::TempDir;

use super::{
    CompilerEngine, Diagnostic, DiagnosticCategory, DiagnosticLocation, EmittedFile, SourceId,
};
use crate::{
    paths::{common_ancestor, relative_to, resolve_against},
    project::ProjectOptions,
};

/// Environment variable naming the `tsc` executable to run
pub const TSC_ENV: &str = "DTSEMIT_TSC";

/// Directory inside the overlay tree for sources that live outside the root
const EXTERNAL_DIR: &str = "__external__";

static LOCATED_DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>.+)\((?P<line>\d+),(?P<column>\d+)\): (?P<category>error|warning|suggestion|message) TS(?P<code>\d+): (?P<message>.*)$",
    )
    .expect("located diagnostic pattern is valid")
});

static GLOBAL_DIAGNOSTIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<category>error|warning|suggestion|message) TS(?P<code>\d+): (?P<message>.*)$")
        .expect("global diagnostic pattern is valid")
});

/// Where the compiler finds a registered source
#[derive(Debug, Clone, PartialEq, Eq)]
enum SourceText {
    /// Compiled from its own path on disk
    OnDisk,
    /// Written into the overlay tree before compiling
    InMemory(String),
}

#[derive(Debug)]
struct Compilation {
    diagnostics: Vec<Diagnostic>,
    /// Indexed by `SourceId`
    outputs: Vec<Vec<EmittedFile>>,
    emitted: bool,
}

/// Directories of one compile
#[derive(Debug)]
struct StagingLayout {
    overlay_dir: PathBuf,
    out_dir: PathBuf,
    /// `rootDir` of the program; output paths mirror the tree below it
    root_dir: PathBuf,
}

#[derive(Debug)]
pub struct TscEngine {
    options: ProjectOptions,
    command: PathBuf,
    /// Logical path to source, in registration order
    sources: IndexMap<PathBuf, SourceText>,
    compilation: Option<Compilation>,
}

impl TscEngine {
    /// Create an engine that runs a specific `tsc` executable
    pub fn with_command(options: ProjectOptions, command: impl Into<PathBuf>) -> Self {
        Self {
            options,
            command: command.into(),
            sources: IndexMap::new(),
            compilation: None,
        }
    }

    fn register(&mut self, logical_path: &Path, text: SourceText) -> Result<SourceId> {
        let (index, previous) = self.sources.insert_full(logical_path.to_path_buf(), text);
        if previous.is_some() {
            debug!("Replacing earlier registration of {}", logical_path.display());
        }
        // Any new source invalidates an earlier compile
        self.compilation = None;
        let index = u32::try_from(index).context("too many registered sources")?;
        Ok(SourceId::new(index))
    }

    fn ensure_compiled(&mut self) -> Result<&mut Compilation> {
        if self.compilation.is_none() {
            self.compilation = Some(self.compile()?);
        }
        self.compilation
            .as_mut()
            .context("compilation missing after compile")
    }

    /// Path of an in-memory source inside the overlay tree
    fn staged_relative(&self, logical: &Path) -> PathBuf {
        logical.strip_prefix(&self.options.root).map_or_else(
            |_| {
                let mut external = PathBuf::from(EXTERNAL_DIR);
                external.extend(
                    logical
                        .components()
                        .filter(|component| matches!(component, Component::Normal(_))),
                );
                external
            },
            Path::to_path_buf,
        )
    }

    fn staging_dir(&self) -> Result<TempDir> {
        let node_modules = self.options.root.join("node_modules");
        if node_modules.is_dir() {
            match tempfile::Builder::new()
                .prefix(".dtsemit-")
                .tempdir_in(&node_modules)
            {
                Ok(dir) => return Ok(dir),
                Err(err) => warn!(
                    "Cannot stage sources in {}: {err}; falling back to the temp directory",
                    node_modules.display()
                ),
            }
        }
        tempfile::Builder::new()
            .prefix("dtsemit-")
            .tempdir()
            .context("failed to create staging directory")
    }

    /// Generated configuration for one compile
    fn staged_tsconfig(&self, layout: &StagingLayout, files: &[PathBuf]) -> Value {
        let mut compiler_options = self.options.compiler_options.clone();

        let has_javascript = self
            .sources
            .keys()
            .any(|path| path.extension().is_some_and(|ext| ext == "js" || ext == "jsx"));
        if has_javascript {
            compiler_options
                .entry("allowJs")
                .or_insert(Value::Bool(true));
        }

        let out = Value::String(layout.out_dir.to_string_lossy().into_owned());
        compiler_options.insert("outDir".to_owned(), out.clone());
        compiler_options.insert("declarationDir".to_owned(), out);
        compiler_options.insert(
            "rootDir".to_owned(),
            Value::String(layout.root_dir.to_string_lossy().into_owned()),
        );
        compiler_options.insert(
            "rootDirs".to_owned(),
            json!([
                self.options.root.to_string_lossy(),
                layout.overlay_dir.to_string_lossy(),
            ]),
        );
        compiler_options.insert("noEmit".to_owned(), Value::Bool(false));

        let files: Vec<Value> = files
            .iter()
            .map(|file| Value::String(file.to_string_lossy().into_owned()))
            .collect();

        // An empty `include` keeps the base config's include list out of the program
        let mut tsconfig = json!({
            "compilerOptions": compiler_options,
            "files": files,
            "include": [],
        });

        if self.options.tsconfig_file_path.is_file() {
            tsconfig["extends"] =
                Value::String(self.options.tsconfig_file_path.to_string_lossy().into_owned());
        }

        tsconfig
    }

    fn compile(&self) -> Result<Compilation> {
        if !self.options.skip_adding_files_from_tsconfig {
            warn!("The tsc engine only compiles registered sources; tsconfig file lists are ignored");
        }

        let staging = self.staging_dir()?;
        let overlay_dir = staging.path().join("overlay");
        let out_dir = staging.path().join("out");

        let mut compiled = Vec::with_capacity(self.sources.len());
        let mut overlay_to_logical = IndexMap::new();
        for (logical, text) in &self.sources {
            let SourceText::InMemory(text) = text else {
                compiled.push(logical.clone());
                continue;
            };
            let staged = overlay_dir.join(self.staged_relative(logical));
            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&staged, text)
                .with_context(|| format!("failed to stage {}", staged.display()))?;
            overlay_to_logical.insert(staged.clone(), logical.clone());
            compiled.push(staged);
        }

        let root_dir = common_ancestor(
            std::iter::once(self.options.root.as_path())
                .chain(compiled.iter().filter_map(|file| file.parent())),
        )
        .unwrap_or_else(|| self.options.root.clone());
        let layout = StagingLayout {
            overlay_dir,
            out_dir,
            root_dir,
        };

        let tsconfig = self.staged_tsconfig(&layout, &compiled);
        let tsconfig_path = staging.path().join("tsconfig.json");
        fs::write(&tsconfig_path, serde_json::to_string_pretty(&tsconfig)?)
            .with_context(|| format!("failed to write {}", tsconfig_path.display()))?;

        debug!(
            "Running {} on {} sources ({} staged in {})",
            self.command.display(),
            compiled.len(),
            overlay_to_logical.len(),
            staging.path().display()
        );
        let output = Command::new(&self.command)
            .arg("--project")
            .arg(&tsconfig_path)
            .arg("--pretty")
            .arg("false")
            .current_dir(&self.options.root)
            .output()
            .with_context(|| format!("failed to run {}", self.command.display()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && stdout.trim().is_empty() && !stderr.trim().is_empty() {
            bail!(
                "{} exited with {}: {}",
                self.command.display(),
                output.status,
                stderr.trim()
            );
        }

        // tsc reports paths relative to its working directory, the project root
        let diagnostics = parse_diagnostics(&stdout, |file| {
            let reported = resolve_against(&self.options.root, file);
            overlay_to_logical.get(&reported).cloned().unwrap_or(reported)
        });

        let mut outputs = Vec::with_capacity(self.sources.len());
        for (logical, compiled_path) in self.sources.keys().zip(&compiled) {
            let staged_output = layout
                .out_dir
                .join(relative_to(&layout.root_dir, compiled_path));
            outputs.push(read_emitted(logical, &staged_output)?);
        }

        Ok(Compilation {
            diagnostics,
            outputs,
            emitted: false,
        })
    }
}

impl CompilerEngine for TscEngine {
    fn with_options(options: ProjectOptions) -> Result<Self> {
        let command = locate_tsc(&options.root);
        Ok(Self::with_command(options, command))
    }

    fn create_source_file(&mut self, logical_path: &Path, text: &str) -> Result<SourceId> {
        self.register(logical_path, SourceText::InMemory(text.to_owned()))
    }

    fn add_source_file_at_path(&mut self, path: &Path) -> Result<SourceId> {
        let metadata = fs::metadata(path)
            .with_context(|| format!("failed to read source file {}", path.display()))?;
        if !metadata.is_file() {
            bail!("source {} is not a file", path.display());
        }
        self.register(path, SourceText::OnDisk)
    }

    fn pre_emit_diagnostics(&mut self) -> Result<Vec<Diagnostic>> {
        Ok(self.ensure_compiled()?.diagnostics.clone())
    }

    fn emit_to_memory(&mut self) -> Result<()> {
        self.ensure_compiled()?.emitted = true;
        Ok(())
    }

    fn emitted_files(&self, source: SourceId) -> Result<Vec<EmittedFile>> {
        let Some(compilation) = self.compilation.as_ref().filter(|c| c.emitted) else {
            bail!("outputs requested for {source} before emission");
        };
        compilation
            .outputs
            .get(source.as_usize())
            .cloned()
            .with_context(|| format!("unknown {source}"))
    }
}

/// `DTSEMIT_TSC`, then the project's local install, then `tsc` on `PATH`
fn locate_tsc(root: &Path) -> PathBuf {
    if let Some(explicit) = env::var_os(TSC_ENV) {
        return PathBuf::from(explicit);
    }
    let executable = if cfg!(windows) { "tsc.cmd" } else { "tsc" };
    let local = root.join("node_modules").join(".bin").join(executable);
    if local.is_file() {
        local
    } else {
        PathBuf::from(executable)
    }
}

/// Declaration file name the compiler produces for a source file name
fn declaration_file_name(source_name: &str) -> Option<String> {
    const DECLARATION_INPUTS: [&str; 3] = [".d.ts", ".d.mts", ".d.cts"];
    // Longer suffixes first: `.mts` also ends with `.ts`
    const MAPPINGS: [(&str, &str); 8] = [
        (".mts", ".d.mts"),
        (".mjs", ".d.mts"),
        (".cts", ".d.cts"),
        (".cjs", ".d.cts"),
        (".tsx", ".d.ts"),
        (".ts", ".d.ts"),
        (".jsx", ".d.ts"),
        (".js", ".d.ts"),
    ];

    if DECLARATION_INPUTS
        .iter()
        .any(|ext| source_name.ends_with(ext))
    {
        return None;
    }

    MAPPINGS.iter().find_map(|(source_ext, declaration_ext)| {
        source_name
            .strip_suffix(source_ext)
            .map(|stem| format!("{stem}{declaration_ext}"))
    })
}

/// Read the declaration (and map, if any) emitted for one staged source
fn read_emitted(logical: &Path, staged_output: &Path) -> Result<Vec<EmittedFile>> {
    let Some(source_name) = logical.file_name().and_then(|name| name.to_str()) else {
        return Ok(Vec::new());
    };
    let Some(declaration_name) = declaration_file_name(source_name) else {
        return Ok(Vec::new());
    };

    let mut emitted = Vec::new();
    for name in [declaration_name.clone(), format!("{declaration_name}.map")] {
        let candidate = staged_output.with_file_name(&name);
        if !candidate.is_file() {
            continue;
        }
        let text = fs::read_to_string(&candidate)
            .with_context(|| format!("failed to read emitted {}", candidate.display()))?;
        emitted.push(EmittedFile {
            path: logical.with_file_name(&name),
            text,
        });
    }
    Ok(emitted)
}

/// Parse `--pretty false` output; indented lines continue the previous message
fn parse_diagnostics(output: &str, resolve_file: impl Fn(&str) -> PathBuf) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = Vec::new();

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(captures) = LOCATED_DIAGNOSTIC.captures(line) {
            diagnostics.push(Diagnostic {
                category: parse_category(&captures["category"]),
                code: captures["code"].parse().unwrap_or_default(),
                message: captures["message"].to_owned(),
                location: Some(DiagnosticLocation {
                    file: resolve_file(&captures["file"]),
                    line: captures["line"].parse().unwrap_or_default(),
                    column: captures["column"].parse().unwrap_or_default(),
                }),
            });
        } else if let Some(captures) = GLOBAL_DIAGNOSTIC.captures(line) {
            diagnostics.push(Diagnostic {
                category: parse_category(&captures["category"]),
                code: captures["code"].parse().unwrap_or_default(),
                message: captures["message"].to_owned(),
                location: None,
            });
        } else if line.starts_with(char::is_whitespace)
            && let Some(last) = diagnostics.last_mut()
        {
            last.message.push('\n');
            last.message.push_str(line.trim_end());
        } else {
            debug!("Unrecognized tsc output: {line}");
        }
    }

    diagnostics
}

fn parse_category(category: &str) -> DiagnosticCategory {
    match category {
        "error" => DiagnosticCategory::Error,
        "warning" => DiagnosticCategory::Warning,
        "suggestion" => DiagnosticCategory::Suggestion,
        _ => DiagnosticCategory::Message,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::project::merge_project_options;

    fn engine_at(root: &Path) -> TscEngine {
        TscEngine::with_command(merge_project_options(root, None), "tsc")
    }

    #[test]
    fn test_declaration_file_names() {
        assert_eq!(declaration_file_name("a.ts").as_deref(), Some("a.d.ts"));
        assert_eq!(declaration_file_name("App.tsx").as_deref(), Some("App.d.ts"));
        assert_eq!(
            declaration_file_name("Widget.vue.ts").as_deref(),
            Some("Widget.vue.d.ts")
        );
        assert_eq!(
            declaration_file_name("Plain.vue.js").as_deref(),
            Some("Plain.vue.d.ts")
        );
        assert_eq!(declaration_file_name("m.mts").as_deref(), Some("m.d.mts"));
        assert_eq!(declaration_file_name("c.cts").as_deref(), Some("c.d.cts"));
        assert_eq!(declaration_file_name("types.d.ts"), None);
        assert_eq!(declaration_file_name("style.css"), None);
    }

    #[test]
    fn test_parse_diagnostics() {
        let output = "\
src/a.ts(3,7): error TS2322: Type 'string' is not assignable to type 'number'.
src/b.ts(1,1): error TS2305: Module './c' has no exported member 'X'.
  Did you mean 'Y'?
error TS5083: Cannot read file '/proj/tsconfig.json'.
";
        let diagnostics = parse_diagnostics(output, |file| Path::new("/proj").join(file));

        assert_eq!(diagnostics.len(), 3);
        assert_eq!(diagnostics[0].code, 2322);
        assert_eq!(
            diagnostics[0].location,
            Some(DiagnosticLocation {
                file: PathBuf::from("/proj/src/a.ts"),
                line: 3,
                column: 7,
            })
        );
        assert_eq!(
            diagnostics[1].message,
            "Module './c' has no exported member 'X'.\n  Did you mean 'Y'?"
        );
        assert_eq!(diagnostics[2].category, DiagnosticCategory::Error);
        assert_eq!(diagnostics[2].location, None);
    }

    #[test]
    fn test_reregistration_keeps_source_id() -> Result<()> {
        let mut engine = engine_at(Path::new("/proj"));
        let first = engine.create_source_file(Path::new("/proj/a.ts"), "export const a = 1;")?;
        let second = engine.create_source_file(Path::new("/proj/b.ts"), "export const b = 1;")?;
        let again = engine.create_source_file(Path::new("/proj/a.ts"), "export const a = 2;")?;

        assert_eq!(first, again);
        assert_ne!(first, second);
        assert_eq!(
            engine.sources.get(Path::new("/proj/a.ts")),
            Some(&SourceText::InMemory("export const a = 2;".to_owned()))
        );
        Ok(())
    }

    #[test]
    fn test_add_source_requires_an_existing_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let source = temp_dir.path().join("index.ts");
        fs::write(&source, "export interface A { a: string }")?;

        let mut engine = engine_at(temp_dir.path());
        let id = engine.add_source_file_at_path(&source)?;
        assert_eq!(id, SourceId::new(0));
        assert_eq!(engine.sources.get(&source), Some(&SourceText::OnDisk));

        let missing = engine.add_source_file_at_path(&temp_dir.path().join("missing.ts"));
        assert!(missing.is_err());
        let directory = engine.add_source_file_at_path(temp_dir.path());
        assert!(directory.is_err());
        Ok(())
    }

    #[test]
    fn test_outputs_require_emission() -> Result<()> {
        let mut engine = engine_at(Path::new("/proj"));
        let id = engine.create_source_file(Path::new("/proj/a.ts"), "export const a = 1;")?;
        let err = engine
            .emitted_files(id)
            .expect_err("outputs are unavailable before emission");
        assert!(err.to_string().contains("before emission"));
        Ok(())
    }

    #[test]
    fn test_staged_relative_paths() {
        let engine = engine_at(Path::new("/proj"));
        assert_eq!(
            engine.staged_relative(Path::new("/proj/src/Widget.vue.ts")),
            PathBuf::from("src/Widget.vue.ts")
        );
        assert_eq!(
            engine.staged_relative(Path::new("/shared/lib/a.ts")),
            PathBuf::from("__external__/shared/lib/a.ts")
        );
    }

    #[test]
    fn test_staged_tsconfig() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path();
        fs::write(root.join("tsconfig.json"), r#"{ "include": ["src"] }"#)?;

        let mut engine = engine_at(root);
        engine.create_source_file(&root.join("Plain.vue.js"), "export default {}")?;

        let layout = StagingLayout {
            overlay_dir: PathBuf::from("/stage/overlay"),
            out_dir: PathBuf::from("/stage/out"),
            root_dir: PathBuf::from("/"),
        };
        let tsconfig = engine.staged_tsconfig(&layout, &[PathBuf::from("/stage/overlay/Plain.vue.js")]);

        assert_eq!(tsconfig["compilerOptions"]["declaration"], json!(true));
        assert_eq!(tsconfig["compilerOptions"]["emitDeclarationOnly"], json!(true));
        assert_eq!(tsconfig["compilerOptions"]["allowJs"], json!(true));
        assert_eq!(tsconfig["compilerOptions"]["outDir"], json!("/stage/out"));
        assert_eq!(tsconfig["compilerOptions"]["rootDir"], json!("/"));
        assert_eq!(
            tsconfig["compilerOptions"]["rootDirs"],
            json!([root.to_string_lossy(), "/stage/overlay"])
        );
        assert_eq!(tsconfig["files"], json!(["/stage/overlay/Plain.vue.js"]));
        // The base config's `include` must not leak into the program
        assert_eq!(tsconfig["include"], json!([]));
        assert_eq!(
            tsconfig["extends"],
            json!(root.join("tsconfig.json").to_string_lossy())
        );
        Ok(())
    }

    #[test]
    fn test_read_emitted_collects_declaration_and_map() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let out = temp_dir.path().join("out/src");
        fs::create_dir_all(&out)?;
        fs::write(out.join("a.d.ts"), "export declare const a = 1;\n")?;
        fs::write(out.join("a.d.ts.map"), "{}")?;

        let emitted = read_emitted(Path::new("/proj/src/a.ts"), &out.join("a.ts"))?;
        assert_eq!(
            emitted,
            vec![
                EmittedFile {
                    path: PathBuf::from("/proj/src/a.d.ts"),
                    text: "export declare const a = 1;\n".to_owned(),
                },
                EmittedFile {
                    path: PathBuf::from("/proj/src/a.d.ts.map"),
                    text: "{}".to_owned(),
                },
            ]
        );

        let nothing = read_emitted(Path::new("/proj/src/b.ts"), &out.join("b.ts"))?;
        assert!(nothing.is_empty());
        Ok(())
    }

    /// Stand-in for `tsc`: records the generated config, writes declarations
    /// where `tsc` would put them and reports one diagnostic per source
    #[cfg(unix)]
    fn write_stub_compiler(dir: &Path, record: &Path) -> Result<PathBuf> {
        use std::os::unix::fs::PermissionsExt;

        let script = format!(
            r#"#!/bin/sh
config="$2"
stage=$(dirname "$config")
overlay="node_modules/$(basename "$stage")/overlay"
cp "$config" "{record}"
mkdir -p "$stage/out/src" "$stage/out/$overlay/src"
printf 'export declare const index: number;\n' > "$stage/out/src/index.d.ts"
printf 'export interface Props {{ msg: string }}\n' > "$stage/out/$overlay/src/Widget.vue.d.ts"
echo "src/index.ts(2,14): error TS2322: Type 'string' is not assignable to type 'number'."
echo "$overlay/src/Widget.vue.ts(3,5): error TS2304: Cannot find name 'foo'."
exit 2
"#,
            record = record.display()
        );
        let stub = dir.join("stub-tsc");
        fs::write(&stub, script)?;
        fs::set_permissions(&stub, fs::Permissions::from_mode(0o755))?;
        Ok(stub)
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_in_place_with_overlay() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("proj");
        fs::create_dir_all(root.join("src"))?;
        fs::create_dir_all(root.join("node_modules"))?;
        let index = root.join("src/index.ts");
        fs::write(&index, "import { helper } from './util'\nexport const index: number = helper()\n")?;
        // Imported by index.ts but never registered
        fs::write(root.join("src/util.js"), "export const helper = () => 1\n")?;

        let record = temp_dir.path().join("recorded-tsconfig.json");
        let stub = write_stub_compiler(temp_dir.path(), &record)?;
        let mut engine = TscEngine::with_command(merge_project_options(&root, None), stub);

        let index_id = engine.add_source_file_at_path(&index)?;
        let widget_id = engine.create_source_file(
            &root.join("src/Widget.vue.ts"),
            "export interface Props { msg: string }\n",
        )?;

        let diagnostics = engine.pre_emit_diagnostics()?;
        let reported: Vec<_> = diagnostics
            .iter()
            .map(|diagnostic| (diagnostic.code, diagnostic.location.as_ref().map(|l| l.file.clone())))
            .collect();
        assert_eq!(
            reported,
            vec![
                (2322, Some(root.join("src/index.ts"))),
                (2304, Some(root.join("src/Widget.vue.ts"))),
            ]
        );

        let tsconfig: Value = serde_json::from_str(&fs::read_to_string(&record)?)?;
        let files: Vec<PathBuf> = tsconfig["files"]
            .as_array()
            .context("files list")?
            .iter()
            .filter_map(Value::as_str)
            .map(PathBuf::from)
            .collect();
        assert_eq!(files.len(), 2);
        // Disk sources compile from their own path, next to what they import
        assert_eq!(files[0], index);
        assert!(files[1].ends_with("overlay/src/Widget.vue.ts"));
        assert!(files[1].starts_with(root.join("node_modules")));
        assert_eq!(tsconfig["include"], json!([]));
        let root_dir = PathBuf::from(
            tsconfig["compilerOptions"]["rootDir"]
                .as_str()
                .context("rootDir")?,
        );
        assert_eq!(root_dir, root);
        assert!(root.join("src/util.js").starts_with(&root_dir));

        engine.emit_to_memory()?;
        assert_eq!(
            engine.emitted_files(index_id)?,
            vec![EmittedFile {
                path: root.join("src/index.d.ts"),
                text: "export declare const index: number;\n".to_owned(),
            }]
        );
        assert_eq!(
            engine.emitted_files(widget_id)?,
            vec![EmittedFile {
                path: root.join("src/Widget.vue.d.ts"),
                text: "export interface Props { msg: string }\n".to_owned(),
            }]
        );

        // The scratch directory is gone once the compile is done
        assert_eq!(fs::read_dir(root.join("node_modules"))?.count(), 0);
        Ok(())
    }
}
