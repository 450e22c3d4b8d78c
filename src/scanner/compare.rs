//! Streamed byte-for-byte comparison of file contents.
//!
//! Two files are equal when they yield the same bytes up to EOF. Files are
//! read in fixed-size chunks on both sides and the comparison stops at the
//! first chunk that differs, so unequal files usually cost one chunk each.
//! No digest is involved; a positive answer is exact.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::CompareError;

/// Default chunk size for content comparison (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable comparer owning one read buffer per side.
///
/// A worker creates one comparer and reuses it for every comparison in its
/// bucket so the buffers are allocated once.
#[derive(Debug)]
pub struct ContentComparer {
    left: Vec<u8>,
    right: Vec<u8>,
}

impl Default for ContentComparer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

impl ContentComparer {
    /// Create a comparer reading `buffer_size` bytes per chunk (minimum 1).
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            left: vec![0; buffer_size],
            right: vec![0; buffer_size],
        }
    }

    /// Chunk size in bytes.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.left.len()
    }

    /// Compare the contents of two files.
    ///
    /// # Errors
    ///
    /// Any failure to open or read either file is returned as an error; it
    /// is never folded into a "not equal" answer.
    pub fn equal(&mut self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        let mut left = File::open(a).map_err(|e| CompareError::from_io(a, e))?;
        let mut right = File::open(b).map_err(|e| CompareError::from_io(b, e))?;

        loop {
            let left_len =
                fill_chunk(&mut left, &mut self.left).map_err(|e| CompareError::from_io(a, e))?;
            let right_len =
                fill_chunk(&mut right, &mut self.right).map_err(|e| CompareError::from_io(b, e))?;

            if left_len != right_len {
                log::trace!(
                    "Length mismatch while comparing {} and {}",
                    a.display(),
                    b.display()
                );
                return Ok(false);
            }
            if left_len == 0 {
                return Ok(true);
            }
            if self.left[..left_len] != self.right[..right_len] {
                return Ok(false);
            }
        }
    }
}

/// Read until `buf` is full or EOF is reached, returning the bytes read.
///
/// A single `read` call may return less than requested without being at
/// EOF, so chunks are only comparable after they are filled.
fn fill_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
