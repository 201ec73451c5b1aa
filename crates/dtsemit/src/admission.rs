//! Classification of admitted modules
//!
//! Every identifier that passes the path filter is classified into one of two
//! kinds. A component script block (`Widget.vue?vue&type=script&lang.ts`) is
//! registered by content under a synthesized path (`Widget.vue.ts`), so the
//! component file itself is never read. A plain `.ts`/`.tsx` file is registered
//! by path and read by the compiler engine; the bundler's transformed code is
//! discarded so the engine resolves the module graph from the real sources.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    filter::strip_query,
    paths::{normalize_slashes, resolve_against},
    types::{ModuleKind, ScriptLang},
};

static SCRIPT_BLOCK_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.vue\?.*type=script").expect("script block pattern is valid"));

static TYPED_SCRIPT_LANG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"lang[.=]ts").expect("script lang pattern is valid"));

static TYPESCRIPT_SOURCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.tsx?$").expect("source extension pattern is valid"));

/// How an admitted module is handed to the compiler engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Script block of a component; the bundler's content is registered under
    /// `logical_path`
    ScriptBlock {
        component_path: PathBuf,
        logical_path: PathBuf,
        lang: ScriptLang,
    },
    /// Source file the compiler engine reads from disk
    Standalone { path: PathBuf },
}

impl Admission {
    pub fn kind(&self) -> ModuleKind {
        match self {
            Self::ScriptBlock { .. } => ModuleKind::ExtractedScriptBlock,
            Self::Standalone { .. } => ModuleKind::StandaloneSource,
        }
    }

    /// Path the compiler engine indexes the module under
    pub fn logical_path(&self) -> &Path {
        match self {
            Self::ScriptBlock { logical_path, .. } => logical_path,
            Self::Standalone { path } => path,
        }
    }

    pub fn into_logical_path(self) -> PathBuf {
        match self {
            Self::ScriptBlock { logical_path, .. } => logical_path,
            Self::Standalone { path } => path,
        }
    }
}

/// Classify a module identifier, returning `None` when it is not
/// declaration-relevant
pub fn classify(id: &str, root: &Path) -> Option<Admission> {
    let id = normalize_slashes(id);

    if SCRIPT_BLOCK_ID.is_match(&id) {
        let component_path = resolve_against(root, strip_query(&id));
        let lang = if TYPED_SCRIPT_LANG.is_match(&id) {
            ScriptLang::TypeScript
        } else {
            ScriptLang::JavaScript
        };

        let mut logical = OsString::from(component_path.as_os_str());
        logical.push(".");
        logical.push(lang.logical_extension());

        return Some(Admission::ScriptBlock {
            component_path,
            logical_path: PathBuf::from(logical),
            lang,
        });
    }

    if TYPESCRIPT_SOURCE.is_match(&id) {
        return Some(Admission::Standalone {
            path: resolve_against(root, &*id),
        });
    }

    None
}
