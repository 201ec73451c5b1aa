//! Include/exclude gate for module identifiers
//!
//! A module identifier is declaration-relevant when it matches at least one
//! include pattern and no exclude pattern. Glob patterns are evaluated against
//! the identifier with any bundler query suffix (`?vue&type=script...`) removed;
//! regular expressions are tested against the full identifier.

use std::{path::Path, slice};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use log::trace;
use regex::Regex;
use serde::Deserialize;

use crate::paths::normalize_slashes;

/// A single matcher specification
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FilterPattern {
    /// Glob pattern, anchored at the root directory unless absolute or `**`-prefixed
    Glob(String),
    /// Regular expression tested anywhere in the identifier
    Regex { regex: String },
}

impl FilterPattern {
    pub fn glob(pattern: impl Into<String>) -> Self {
        Self::Glob(pattern.into())
    }

    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            regex: pattern.into(),
        }
    }
}

/// One pattern or a set of patterns
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FilterSpec {
    // Listed first: a one-element array must not be read as a struct pattern
    Many(Vec<FilterPattern>),
    One(FilterPattern),
}

impl FilterSpec {
    pub fn patterns(&self) -> &[FilterPattern] {
        match self {
            Self::One(pattern) => slice::from_ref(pattern),
            Self::Many(patterns) => patterns,
        }
    }

    /// Default include set: component files and TypeScript sources
    pub fn default_include() -> Self {
        Self::Many(vec![
            FilterPattern::glob("**/*.vue"),
            FilterPattern::glob("**/*.ts"),
            FilterPattern::glob("**/*.tsx"),
        ])
    }

    /// Default exclude: anything below a `node_modules` segment
    pub fn default_exclude() -> Self {
        Self::One(FilterPattern::glob("**/node_modules/**"))
    }
}

impl From<Vec<String>> for FilterSpec {
    fn from(globs: Vec<String>) -> Self {
        Self::Many(globs.into_iter().map(FilterPattern::Glob).collect())
    }
}

#[derive(Debug)]
struct Matchers {
    globs: GlobSet,
    regexes: Vec<Regex>,
}

impl Matchers {
    fn build(spec: &FilterSpec, root: &Path) -> Result<Self> {
        let root = normalize_slashes(&root.to_string_lossy()).into_owned();
        let mut globs = GlobSetBuilder::new();
        let mut regexes = Vec::new();

        for pattern in spec.patterns() {
            match pattern {
                FilterPattern::Glob(glob) => {
                    let anchored = anchor_glob(&root, glob);
                    let compiled = GlobBuilder::new(&anchored)
                        .literal_separator(true)
                        .build()
                        .with_context(|| format!("invalid glob pattern `{glob}`"))?;
                    globs.add(compiled);
                }
                FilterPattern::Regex { regex } => {
                    let compiled = Regex::new(regex)
                        .with_context(|| format!("invalid regular expression `{regex}`"))?;
                    regexes.push(compiled);
                }
            }
        }

        Ok(Self {
            globs: globs.build().context("failed to compile glob set")?,
            regexes,
        })
    }

    fn is_empty(&self) -> bool {
        self.globs.is_empty() && self.regexes.is_empty()
    }

    fn matches(&self, path: &str, id: &str) -> bool {
        self.globs.is_match(path) || self.regexes.iter().any(|re| re.is_match(id))
    }
}

/// Relative globs are resolved against the root directory; absolute ones and
/// ones that start with `**` already match anywhere they are meant to.
fn anchor_glob(root: &str, pattern: &str) -> String {
    let pattern = normalize_slashes(pattern);
    if pattern.starts_with("**") || Path::new(pattern.as_ref()).is_absolute() {
        return pattern.into_owned();
    }
    let pattern = pattern.trim_start_matches("./");
    format!(
        "{}/{}",
        globset::escape(root.trim_end_matches('/')),
        pattern
    )
}

/// Pure include/exclude predicate, safe to share across threads
#[derive(Debug)]
pub struct PathFilter {
    include: Matchers,
    exclude: Matchers,
}

impl PathFilter {
    pub fn new(include: &FilterSpec, exclude: &FilterSpec, root: &Path) -> Result<Self> {
        Ok(Self {
            include: Matchers::build(include, root)?,
            exclude: Matchers::build(exclude, root)?,
        })
    }

    /// Check whether a module identifier is declaration-relevant
    pub fn matches(&self, id: &str) -> bool {
        // Virtual modules are never real files
        if id.contains('\0') {
            return false;
        }

        let id = normalize_slashes(id);
        let path = strip_query(&id);

        if self.exclude.matches(path, &id) {
            trace!("Excluded module {id}");
            return false;
        }

        if self.include.is_empty() {
            return true;
        }

        let included = self.include.matches(path, &id);
        if !included {
            trace!("Module {id} matches no include pattern");
        }
        included
    }
}

/// Drop a bundler query suffix (`?...`) from a module identifier
pub fn strip_query(id: &str) -> &str {
    id.split_once('?').map_or(id, |(path, _)| path)
}
