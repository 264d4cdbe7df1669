//! Core types for snapshot building and drift detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hash: SHA-256 content digest
pub type Hash = [u8; 32];

/// Files strictly larger than this are recorded by digest instead of copied (1 MiB)
pub const DEFAULT_SIZE_THRESHOLD: u64 = 1024 * 1024;

/// Absolute paths longer than this (in characters) are never walked
pub const DEFAULT_MAX_PATH_LEN: usize = 255;

/// Read size used when streaming a file through the digest
pub const DIGEST_BLOCK_SIZE: usize = 64 * 1024;

/// Extension appended to a large file's relative path for its sidecar record
pub const SIDECAR_EXTENSION: &str = "hash";

/// How a file is represented inside a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Full byte copy stored at the mirrored path
    Small,
    /// Digest and size stored in a sidecar next to the mirrored path
    Large,
}

/// One file as known to a snapshot
///
/// `relative_path` is root-relative, forward-slash separated and unique within
/// a snapshot. Large records carry `digest`; small records never do, their
/// content lives in the stored copy. Either field may be absent when a sidecar
/// could not be parsed, which the diff treats as "always differs".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub relative_path: String,
    pub kind: FileKind,
    #[serde(with = "optional_hex", skip_serializing_if = "Option::is_none", default)]
    pub digest: Option<Hash>,
    pub size: Option<u64>,
}

impl FileRecord {
    pub fn small(relative_path: impl Into<String>, size: Option<u64>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: FileKind::Small,
            digest: None,
            size,
        }
    }

    pub fn large(relative_path: impl Into<String>, digest: Option<Hash>, size: Option<u64>) -> Self {
        Self {
            relative_path: relative_path.into(),
            kind: FileKind::Large,
            digest,
            size,
        }
    }

    /// True when a large record lost its digest or size to a malformed sidecar
    pub fn is_malformed(&self) -> bool {
        self.kind == FileKind::Large && (self.digest.is_none() || self.size.is_none())
    }
}

/// Classification of one path by the diff engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiffKind {
    New,
    Modified,
    Removed,
    Unchanged,
}

impl DiffKind {
    /// Stable label used in the one-line report format
    pub fn label(&self) -> &'static str {
        match self {
            DiffKind::New => "NEW",
            DiffKind::Modified => "MODIFIED",
            DiffKind::Removed => "REMOVED",
            DiffKind::Unchanged => "UNCHANGED",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified path. Produced by the diff engine, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiffRecord {
    pub kind: DiffKind,
    pub path: String,
}

impl DiffRecord {
    pub fn new(kind: DiffKind, path: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.path)
    }
}

mod optional_hex {
    use super::Hash;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Hash>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(hash) => serializer.serialize_str(&hex::encode(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hash>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => {
                let mut out = [0u8; 32];
                hex::decode_to_slice(&s, &mut out).map_err(serde::de::Error::custom)?;
                Ok(Some(out))
            }
        }
    }
}
