//! Path canonicalization and relative-path helpers

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};

/// Canonicalize a path through the filesystem
///
/// Resolves symlinks, `.` and `..`. Uses dunce so Windows paths stay free of
/// the verbatim `\\?\` prefix.
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, StorageError> {
    dunce::canonicalize(path).map_err(|e| {
        StorageError::InvalidPath(format!("Failed to canonicalize {}: {}", path.display(), e))
    })
}

/// Normalize a path without touching the filesystem
///
/// Drops `.` components, folds `..` into its parent and removes trailing
/// separators. `..` above the root stays at the root.
pub fn normalize_lexical(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolve a path to its canonical absolute form, falling back to lexical
/// normalization against the current directory when it does not exist yet.
pub fn absolutize(path: &Path) -> Result<PathBuf, StorageError> {
    if let Ok(canonical) = canonicalize_path(path) {
        return Ok(canonical);
    }
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|e| StorageError::io(".", e))?;
        cwd.join(path)
    };
    Ok(normalize_lexical(&joined))
}

/// Root-relative, forward-slash form of `path` under `root`
///
/// Returns None when `path` is not under `root` or is the root itself.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Inverse of `relative_key`: join a forward-slash key onto a root
pub fn join_key(root: &Path, key: &str) -> PathBuf {
    let mut out = root.to_path_buf();
    for part in key.split('/').filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}

/// Length of the path in characters
pub fn char_len(path: &Path) -> usize {
    path.to_string_lossy().chars().count()
}
