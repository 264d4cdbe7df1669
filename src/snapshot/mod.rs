//! Stored snapshots
//!
//! A snapshot mirrors the live tree's relative layout: small files are copied
//! verbatim, large files are replaced by `<path>.hash` sidecars holding their
//! digest and size.

pub mod archive;
pub mod builder;
pub mod loader;
pub mod sidecar;

pub use archive::{SnapshotArchive, StagedSnapshot, TarGzArchive};
pub use builder::{BuildReport, PathFailure, SnapshotBuilder};
pub use loader::SnapshotIndex;
