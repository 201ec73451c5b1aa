//! Plugin configuration
//!
//! Layers, lowest precedence first: built-in defaults, the user config file
//! (`<config dir>/dtsemit/dtsemit.toml`), `<root>/dtsemit.toml`, an explicit
//! config file, then `DTSEMIT_*` environment variables. Command-line flags are
//! applied on top by the binary.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use etcetera::BaseStrategy;
use log::debug;
use serde::Deserialize;

use crate::{
    filter::{FilterSpec, PathFilter},
    paths::resolve_against,
    project::ProjectOverrides,
};

/// Name of the project-level configuration file
pub const CONFIG_FILE_NAME: &str = "dtsemit.toml";

pub const ENV_ROOT: &str = "DTSEMIT_ROOT";
pub const ENV_CLEAN_VUE_FILE_NAME: &str = "DTSEMIT_CLEAN_VUE_FILE_NAME";

/// Immutable per-build configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Identifiers that are declaration-relevant
    pub include: FilterSpec,
    /// Identifiers that never are, even when included
    pub exclude: FilterSpec,
    /// Absolute base for relative identifiers and emitted paths
    pub root: PathBuf,
    /// Compiler overrides layered onto the mandatory declaration settings
    pub project: Option<ProjectOverrides>,
    /// Turn `X.vue.d.ts` into `X.d.ts` and strip `.vue` from quoted specifiers
    pub clean_vue_file_name: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include: FilterSpec::default_include(),
            exclude: FilterSpec::default_exclude(),
            root: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            project: None,
            clean_vue_file_name: false,
        }
    }
}

/// One configuration layer as written in a TOML file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub include: Option<FilterSpec>,
    pub exclude: Option<FilterSpec>,
    pub root: Option<PathBuf>,
    pub project: Option<ProjectOverrides>,
    pub clean_vue_file_name: Option<bool>,
}

impl ConfigFile {
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("invalid dtsemit configuration")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("in {}", path.display()))
    }
}

impl Config {
    /// Load every configuration layer
    ///
    /// `root` (from the command line) both locates `<root>/dtsemit.toml` and
    /// overrides any root set by a lower layer.
    pub fn load(explicit: Option<&Path>, root: Option<&Path>) -> Result<Self> {
        let cwd = env::current_dir().context("failed to determine the working directory")?;
        let mut config = Self::default();
        if let Some(root) = root {
            config.root = resolve_against(&cwd, root);
        }

        if let Some(user_config) = user_config_path()
            && user_config.is_file()
        {
            config.apply_file(&user_config)?;
        }

        let project_config = config.root.join(CONFIG_FILE_NAME);
        if project_config.is_file() {
            config.apply_file(&project_config)?;
        }

        if let Some(explicit) = explicit {
            let explicit = resolve_against(&cwd, explicit);
            config.apply_file(&explicit)?;
        }

        config.apply_env(|key| env::var(key).ok(), &cwd)?;

        if let Some(root) = root {
            config.root = resolve_against(&cwd, root);
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: &Path) -> Result<()> {
        debug!("Loading configuration from {}", path.display());
        let layer = ConfigFile::from_path(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        self.apply(layer, base_dir);
        Ok(())
    }

    /// Layer a config file on top; a relative `root` is resolved against
    /// `base_dir`, the directory of the file it came from
    pub fn apply(&mut self, layer: ConfigFile, base_dir: &Path) {
        if let Some(include) = layer.include {
            self.include = include;
        }
        if let Some(exclude) = layer.exclude {
            self.exclude = exclude;
        }
        if let Some(root) = layer.root {
            self.root = resolve_against(base_dir, root);
        }
        if let Some(project) = layer.project {
            match &mut self.project {
                Some(existing) => existing.merge_from(project),
                None => self.project = Some(project),
            }
        }
        if let Some(clean) = layer.clean_vue_file_name {
            self.clean_vue_file_name = clean;
        }
    }

    /// Apply `DTSEMIT_*` variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>, cwd: &Path) -> Result<()> {
        if let Some(root) = lookup(ENV_ROOT).filter(|value| !value.is_empty()) {
            self.root = resolve_against(cwd, root);
        }
        if let Some(clean) = lookup(ENV_CLEAN_VUE_FILE_NAME) {
            self.clean_vue_file_name = parse_bool(&clean)
                .with_context(|| format!("invalid value for {ENV_CLEAN_VUE_FILE_NAME}"))?;
        }
        Ok(())
    }

    /// Build the include/exclude predicate for this configuration
    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(&self.include, &self.exclude, &self.root)
    }
}

/// `<config dir>/dtsemit/dtsemit.toml` for the current user
pub fn user_config_path() -> Option<PathBuf> {
    let strategy = etcetera::choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("dtsemit").join(CONFIG_FILE_NAME))
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("expected a boolean, found `{other}`"),
    }
}
