//! Path filter: decides which directories and files a walk must not enter.
//!
//! Every exclusion decision lives here: system pseudo-filesystems, the
//! snapshot's own storage and staging locations, and overlong paths. The
//! exclusion set is an injected value, so callers and tests can substitute
//! their own without touching process-wide state.

use crate::tree::path;
use crate::types::DEFAULT_MAX_PATH_LEN;
use std::path::{Path, PathBuf};

/// Pseudo-filesystems and volatile locations skipped by default
pub const SYSTEM_EXCLUDED_PATHS: &[&str] = &["/proc", "/sys", "/dev", "/run", "/tmp", "/var/run"];

/// Why a path was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Equal to or nested under this excluded root
    Excluded(PathBuf),
    /// Absolute path length in characters exceeded the ceiling
    TooLong(usize),
}

/// Exclusion policy applied before a walk descends into a directory
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded: Vec<PathBuf>,
    max_path_len: usize,
}

impl Default for PathFilter {
    fn default() -> Self {
        Self::new(
            SYSTEM_EXCLUDED_PATHS.iter().map(PathBuf::from),
            DEFAULT_MAX_PATH_LEN,
        )
    }
}

impl PathFilter {
    /// Create a filter from excluded roots and a path-length ceiling
    ///
    /// Each root is normalized, and when it exists on disk its canonical form
    /// is excluded as well (e.g. `/var/run` resolving to `/run`).
    pub fn new<I>(excluded: I, max_path_len: usize) -> Self
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut filter = Self {
            excluded: Vec::new(),
            max_path_len,
        };
        for root in excluded {
            filter.push_excluded(&root);
        }
        filter
    }

    /// Filter with no excluded roots, only the path-length ceiling
    pub fn unrestricted(max_path_len: usize) -> Self {
        Self::new(std::iter::empty(), max_path_len)
    }

    /// Add another excluded root (snapshot storage, staging directory, ...)
    pub fn with_excluded(mut self, root: impl AsRef<Path>) -> Self {
        self.push_excluded(root.as_ref());
        self
    }

    fn push_excluded(&mut self, root: &Path) {
        let normalized = path::normalize_lexical(root);
        if let Ok(canonical) = path::canonicalize_path(&normalized) {
            if canonical != normalized && !self.excluded.contains(&canonical) {
                self.excluded.push(canonical);
            }
        }
        if !self.excluded.contains(&normalized) {
            self.excluded.push(normalized);
        }
    }

    pub fn excluded(&self) -> &[PathBuf] {
        &self.excluded
    }

    pub fn max_path_len(&self) -> usize {
        self.max_path_len
    }

    /// Copy of this filter for a walk rooted at `root`
    ///
    /// Excluded roots that enclose the walk root itself are dropped: they
    /// would otherwise hide the entire requested tree.
    pub fn scoped_to(&self, root: &Path) -> PathFilter {
        let root = path::normalize_lexical(root);
        PathFilter {
            excluded: self
                .excluded
                .iter()
                .filter(|excluded| !root.starts_with(excluded))
                .cloned()
                .collect(),
            max_path_len: self.max_path_len,
        }
    }

    /// Decide whether `candidate` (and everything beneath it) must be skipped
    pub fn decide(&self, candidate: &Path) -> Option<SkipReason> {
        let normalized = path::normalize_lexical(candidate);

        let len = path::char_len(&normalized);
        if len > self.max_path_len {
            return Some(SkipReason::TooLong(len));
        }

        // Component-wise prefix: /tmpfoo is not under /tmp
        self.excluded
            .iter()
            .find(|excluded| normalized.starts_with(excluded))
            .map(|excluded| SkipReason::Excluded(excluded.clone()))
    }

    pub fn should_skip(&self, candidate: &Path) -> bool {
        self.decide(candidate).is_some()
    }
}
