//! Lexical path helpers shared by admission and emission
//!
//! Nothing here touches the filesystem: module identifiers and emitted paths
//! may name files that do not exist on disk (synthesized script block paths).

use std::{
    borrow::Cow,
    path::{Component, Path, PathBuf},
};

use cow_utils::CowUtils;

/// Convert Windows separators to forward slashes
pub fn normalize_slashes(id: &str) -> Cow<'_, str> {
    id.cow_replace('\\', "/")
}

/// Remove `.` and resolve `..` components without consulting the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` above the root stays at the root; above a relative start it is kept
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolve `path` against `base` the way a path resolver would: absolute paths win
pub fn resolve_against(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if path.is_absolute() {
        normalize_lexically(path)
    } else {
        normalize_lexically(&base.join(path))
    }
}

/// Compute `target` relative to `from`, producing `..` segments when `target`
/// lies outside of `from`
pub fn relative_to(from: &Path, target: &Path) -> PathBuf {
    let from = normalize_lexically(from);
    let target = normalize_lexically(target);

    let from_parts: Vec<Component<'_>> = from.components().collect();
    let target_parts: Vec<Component<'_>> = target.components().collect();

    let shared = from_parts
        .iter()
        .zip(&target_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in shared..from_parts.len() {
        relative.push("..");
    }
    for part in &target_parts[shared..] {
        relative.push(part);
    }
    relative
}

/// Deepest directory that contains every one of `dirs`; `None` when empty
pub fn common_ancestor<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Option<PathBuf> {
    let mut dirs = dirs.into_iter();
    let mut ancestor = normalize_lexically(dirs.next()?);
    for dir in dirs {
        let dir = normalize_lexically(dir);
        while !dir.starts_with(&ancestor) {
            if !ancestor.pop() {
                break;
            }
        }
    }
    Some(ancestor)
}
