//! Filesystem walker yielding the regular files under a root

use crate::tree::filter::{PathFilter, SkipReason};
use crate::tree::path;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// A regular file found by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Root-relative, forward-slash key
    pub relative_path: String,
    pub absolute_path: PathBuf,
    /// Size observed when the entry was visited
    pub size: u64,
}

/// Filesystem walker
///
/// Symbolic links are never followed and non-regular files are never yielded.
/// Order follows the directory-entry order returned by the OS; nothing is
/// sorted, so callers must not depend on it.
pub struct Walker {
    root: PathBuf,
    filter: PathFilter,
}

impl Walker {
    /// Create a walker for `root`, applying `filter` to everything beneath it
    ///
    /// The root is canonicalized so filter decisions compare canonical paths.
    pub fn new(root: PathBuf, filter: &PathFilter) -> Self {
        let root = path::absolutize(&root).unwrap_or(root);
        let filter = filter.scoped_to(&root);
        Self { root, filter }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily enumerate regular files
    ///
    /// Unreadable entries are logged and skipped; one bad entry never ends
    /// the walk.
    pub fn files(&self) -> impl Iterator<Item = WalkedFile> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .into_iter()
            .filter_entry(move |entry| self.admit(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) => self.to_walked_file(entry),
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    warn!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    None
                }
            })
    }

    fn admit(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return true;
        }
        match self.filter.decide(entry.path()) {
            None => true,
            Some(SkipReason::TooLong(len)) => {
                trace!(path = %entry.path().display(), len, "Path exceeds length ceiling, skipping");
                false
            }
            Some(SkipReason::Excluded(root)) => {
                debug!(
                    path = %entry.path().display(),
                    excluded_root = %root.display(),
                    "Excluded path, not descending"
                );
                false
            }
        }
    }

    fn to_walked_file(&self, entry: DirEntry) -> Option<WalkedFile> {
        if !entry.file_type().is_file() {
            return None;
        }
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to read metadata");
                return None;
            }
        };
        let relative_path = path::relative_key(&self.root, entry.path())?;
        Some(WalkedFile {
            relative_path,
            absolute_path: entry.into_path(),
            size: metadata.len(),
        })
    }
}
