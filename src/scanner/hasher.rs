//! BLAKE3 prefix digests for the optional pre-filter.
//!
//! # Overview
//!
//! Hashing the first few kilobytes of every file in a bucket is a cheap way
//! to split it before the byte comparison runs. A digest mismatch proves the
//! files differ; a digest match proves nothing, so matching files still go
//! through [`ContentComparer`](super::ContentComparer).

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::CompareError;

/// BLAKE3 digest (32 bytes).
pub type Hash = [u8; 32];

/// Default number of leading bytes hashed by the pre-filter.
pub const PREHASH_SIZE: usize = 4096;

/// Streaming BLAKE3 hasher for file prefixes.
#[derive(Debug, Clone)]
pub struct Hasher {
    prefix_len: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher covering [`PREHASH_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefix_len: PREHASH_SIZE,
        }
    }

    /// Create a hasher covering `prefix_len` bytes (minimum 1).
    #[must_use]
    pub fn with_prefix_len(prefix_len: usize) -> Self {
        Self {
            prefix_len: prefix_len.max(1),
        }
    }

    /// Number of leading bytes covered by [`prehash`](Self::prehash).
    #[must_use]
    pub fn prefix_len(&self) -> usize {
        self.prefix_len
    }

    /// Digest of the first `prefix_len` bytes of the file.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, CompareError> {
        let file = File::open(path).map_err(|e| CompareError::from_io(path, e))?;
        let mut reader = file.take(self.prefix_len as u64);
        let mut hasher = blake3::Hasher::new();
        let mut buf = [0u8; 8192];

        loop {
            match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    hasher.update(&buf[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CompareError::from_io(path, e)),
            }
        }

        Ok(*hasher.finalize().as_bytes())
    }
}

/// Format a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    blake3::Hash::from(*hash).to_hex().to_string()
}
