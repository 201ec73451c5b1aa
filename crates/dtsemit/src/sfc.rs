//! Script block extraction for single-file components
//!
//! Template-language tooling exposes a component's script as a pseudo-module
//! (`Widget.vue?vue&type=script&setup=true&lang.ts`). The driver uses this to
//! replay that behavior when no bundler is present: a component's `<script>`
//! and `<script setup>` blocks become one script module.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<script\b(?P<attrs>[^>]*)>(?P<body>.*?)</script\s*>")
        .expect("script block pattern is valid")
});

static LANG_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\blang\s*=\s*["']?(?P<lang>[A-Za-z]+)"#).expect("lang attribute pattern is valid")
});

static SETUP_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|\s)setup(\s|=|$)").expect("setup attribute pattern is valid"));

/// The combined script module of one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptModule {
    pub content: String,
    pub lang: Option<String>,
    pub setup: bool,
}

impl ScriptModule {
    /// Identifier the bundler would give this module
    pub fn module_id(&self, component: &Path) -> String {
        let mut id = format!("{}?vue&type=script", component.to_string_lossy());
        if self.setup {
            id.push_str("&setup=true");
        }
        if let Some(lang) = &self.lang {
            id.push_str("&lang.");
            id.push_str(lang);
        }
        id
    }
}

/// Collect a component's script blocks; `None` when it has none
pub fn extract_script(source: &str) -> Option<ScriptModule> {
    let mut plain = None;
    let mut setup = None;
    let mut lang = None;

    for captures in SCRIPT_BLOCK.captures_iter(source) {
        let attrs = &captures["attrs"];
        let body = captures
            .name("body")
            .map_or("", |body| body.as_str())
            .trim_matches('\n');

        if lang.is_none() {
            lang = LANG_ATTR
                .captures(attrs)
                .map(|lang| lang["lang"].to_owned());
        }

        if SETUP_ATTR.is_match(attrs) {
            setup.get_or_insert(body);
        } else {
            plain.get_or_insert(body);
        }
    }

    let content = match (plain, setup) {
        (None, None) => return None,
        (Some(plain), None) => plain.to_owned(),
        (None, Some(setup)) => setup.to_owned(),
        (Some(plain), Some(setup)) => format!("{plain}\n{setup}"),
    };

    Some(ScriptModule {
        content,
        lang,
        setup: setup.is_some(),
    })
}
