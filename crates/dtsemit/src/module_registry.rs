//! Module registry for tracking admitted modules during a build
//!
//! The ModuleRegistry is the single source of truth for which modules the
//! compiler engine must emit declarations for. Handles are appended while the
//! bundler transforms modules and read once when the bundle is generated.

use std::path::PathBuf;

use log::debug;

use crate::{engine::SourceId, types::ModuleKind};

/// Everything the emission step needs to know about one admitted module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleHandle {
    /// Identifier assigned by the compiler engine
    pub id: SourceId,
    /// Absolute path the compiler engine indexes the content under
    pub logical_path: PathBuf,
    /// Whether the content came from disk or from a component script block
    pub kind: ModuleKind,
}

/// Append-only, ordered collection of module handles
#[derive(Debug, Default)]
pub struct ModuleRegistry {
    handles: Vec<ModuleHandle>,
}

impl ModuleRegistry {
    /// Create a new empty module registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module handle to the registry
    ///
    /// Admitting the same logical path twice is a caller error; the handle is
    /// still appended.
    pub fn push(&mut self, handle: ModuleHandle) -> &ModuleHandle {
        let index = self.handles.len();
        if let Some(previous) = self
            .handles
            .iter()
            .position(|existing| existing.logical_path == handle.logical_path)
        {
            debug!(
                "Module {} admitted again (previous handle #{previous})",
                handle.logical_path.display()
            );
        }
        self.handles.push(handle);
        &self.handles[index]
    }

    /// Iterate over all handles in admission order
    pub fn iter(&self) -> impl Iterator<Item = &ModuleHandle> {
        self.handles.iter()
    }

    /// Get total number of handles in the registry
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Count handles of one kind
    pub fn count_kind(&self, kind: ModuleKind) -> usize {
        self.handles.iter().filter(|handle| handle.kind == kind).count()
    }
}

impl<'a> IntoIterator for &'a ModuleRegistry {
    type Item = &'a ModuleHandle;
    type IntoIter = std::slice::Iter<'a, ModuleHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.handles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: u32, path: &str, kind: ModuleKind) -> ModuleHandle {
        ModuleHandle {
            id: SourceId::new(index),
            logical_path: PathBuf::from(path),
            kind,
        }
    }

    #[test]
    fn test_registry_creation() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_push_preserves_admission_order() {
        let mut registry = ModuleRegistry::new();
        registry.push(handle(0, "/proj/b.ts", ModuleKind::StandaloneSource));
        registry.push(handle(1, "/proj/A.vue.ts", ModuleKind::ExtractedScriptBlock));
        registry.push(handle(2, "/proj/a.ts", ModuleKind::StandaloneSource));

        let paths: Vec<_> = registry
            .iter()
            .map(|handle| handle.logical_path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, ["/proj/b.ts", "/proj/A.vue.ts", "/proj/a.ts"]);
        assert_eq!(registry.count_kind(ModuleKind::StandaloneSource), 2);
        assert_eq!(registry.count_kind(ModuleKind::ExtractedScriptBlock), 1);
    }

    #[test]
    fn test_duplicate_admission_is_not_deduplicated() {
        let mut registry = ModuleRegistry::new();
        registry.push(handle(0, "/proj/a.ts", ModuleKind::StandaloneSource));
        registry.push(handle(0, "/proj/a.ts", ModuleKind::StandaloneSource));
        assert_eq!(registry.len(), 2);
    }
}
