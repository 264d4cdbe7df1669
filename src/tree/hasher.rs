//! Content digests for files using SHA-256

use crate::error::StorageError;
use crate::types::{Hash, DIGEST_BLOCK_SIZE};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Compute the SHA-256 digest of a file's content
///
/// The file is streamed in `DIGEST_BLOCK_SIZE` blocks so memory use does not
/// depend on file size. Any open or read failure aborts the whole computation;
/// no digest is ever produced from a partial read.
pub fn compute_file_digest(file_path: &Path) -> Result<Hash, StorageError> {
    let mut file = File::open(file_path).map_err(|e| StorageError::io(file_path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; DIGEST_BLOCK_SIZE];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StorageError::io(file_path, e)),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().into())
}

/// Compute content hash for in-memory bytes
pub fn compute_content_hash(content: &[u8]) -> Hash {
    Sha256::digest(content).into()
}

/// Lowercase hex rendering used in sidecars and reports
pub fn to_hex(hash: &Hash) -> String {
    hex::encode(hash)
}

/// Parse a 64-character hex digest. Returns None for anything else.
pub fn from_hex(value: &str) -> Option<Hash> {
    if value.len() != 64 {
        return None;
    }
    let mut out = [0u8; 32];
    hex::decode_to_slice(value, &mut out).ok()?;
    Some(out)
}
