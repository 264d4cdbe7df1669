//! Live filesystem access
//!
//! Content digests, path handling, the exclusion filter and the walker that
//! every snapshot and diff pass goes through.

pub mod filter;
pub mod hasher;
pub mod path;
pub mod walker;

pub use filter::{PathFilter, SkipReason};
pub use walker::{WalkedFile, Walker};
