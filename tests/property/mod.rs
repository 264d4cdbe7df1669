//! Property-based tests for the digest engine and sidecar format

mod sidecar_format;
