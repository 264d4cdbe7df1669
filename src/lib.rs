//! Baseline: Filesystem Integrity Snapshots
//!
//! Captures a snapshot of a directory tree (full copies of small files,
//! SHA-256 digests of large ones) and later reconciles the live tree against
//! it, reporting every path as new, modified, removed or unchanged.

pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod snapshot;
pub mod tree;
pub mod types;
