//! Compiler project options and the protected merge
//!
//! User overrides are layered onto the settings declaration emission depends on.
//! Precedence, per key:
//!
//! | key                                   | winner                                   |
//! |---------------------------------------|------------------------------------------|
//! | `compilerOptions.declaration`         | always `true`                            |
//! | `compilerOptions.emitDeclarationOnly` | always `true`                            |
//! | `compilerOptions.noEmitOnError`       | always `true`                            |
//! | any other `compilerOptions.*`         | user value                               |
//! | `tsConfigFilePath`                    | user value (relative to root), else `<root>/tsconfig.json` |
//! | `skipAddingFilesFromTsConfig`         | user value, else `true`                  |
//!
//! `compilerOptions` is merged key by key, so a user table never replaces the
//! protected keys wholesale.

use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::paths::resolve_against;

/// Compiler option keys that declaration emission cannot do without
pub const PROTECTED_COMPILER_OPTIONS: [&str; 3] =
    ["declaration", "emitDeclarationOnly", "noEmitOnError"];

/// User-supplied compiler project overrides, as read from configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ProjectOverrides {
    #[serde(alias = "tsConfigFilePath")]
    pub tsconfig_file_path: Option<PathBuf>,
    #[serde(alias = "skipAddingFilesFromTsConfig")]
    pub skip_adding_files_from_tsconfig: Option<bool>,
    /// Free-form table keyed by the compiler's own option names
    #[serde(alias = "compilerOptions")]
    pub compiler_options: Map<String, Value>,
}

impl ProjectOverrides {
    /// Layer `other` on top of `self`; compiler options merge key by key
    pub fn merge_from(&mut self, other: Self) {
        if other.tsconfig_file_path.is_some() {
            self.tsconfig_file_path = other.tsconfig_file_path;
        }
        if other.skip_adding_files_from_tsconfig.is_some() {
            self.skip_adding_files_from_tsconfig = other.skip_adding_files_from_tsconfig;
        }
        self.compiler_options.extend(other.compiler_options);
    }
}

/// Effective configuration handed to the compiler engine
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectOptions {
    pub root: PathBuf,
    pub tsconfig_file_path: PathBuf,
    pub skip_adding_files_from_tsconfig: bool,
    pub compiler_options: Map<String, Value>,
}

impl ProjectOptions {
    /// Express these options as overrides, so they can be fed back into the merge
    pub fn to_overrides(&self) -> ProjectOverrides {
        ProjectOverrides {
            tsconfig_file_path: Some(self.tsconfig_file_path.clone()),
            skip_adding_files_from_tsconfig: Some(self.skip_adding_files_from_tsconfig),
            compiler_options: self.compiler_options.clone(),
        }
    }
}

/// Merge user overrides over the mandatory declaration settings
pub fn merge_project_options(root: &Path, overrides: Option<&ProjectOverrides>) -> ProjectOptions {
    let default_overrides = ProjectOverrides::default();
    let overrides = overrides.unwrap_or(&default_overrides);

    let mut compiler_options = overrides.compiler_options.clone();
    for key in PROTECTED_COMPILER_OPTIONS {
        let previous = compiler_options.insert(key.to_owned(), Value::Bool(true));
        if let Some(previous) = previous
            && previous != Value::Bool(true)
        {
            warn!("Ignoring compiler option `{key}: {previous}`; declaration emission requires `true`");
        }
    }

    let tsconfig_file_path = overrides.tsconfig_file_path.as_ref().map_or_else(
        || root.join("tsconfig.json"),
        |path| resolve_against(root, path),
    );

    ProjectOptions {
        root: root.to_path_buf(),
        tsconfig_file_path,
        skip_adding_files_from_tsconfig: overrides.skip_adding_files_from_tsconfig.unwrap_or(true),
        compiler_options,
    }
}
