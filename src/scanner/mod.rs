//! Scanner module for directory traversal and file content access.
//!
//! This module provides functionality for:
//! - Parallel directory walking using jwalk, skipping hidden entries
//! - Chunked byte-for-byte content comparison
//! - BLAKE3 prefix digests for the optional rejection pre-filter
//! - Storage identity lookup for hard-link detection
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`compare`]: Streamed content comparison
//! - [`hasher`]: BLAKE3 prefix hashing
//! - [`hardlink`]: Storage identities and hard-link tracking
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("."), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Scan failed: {}", e),
//!     }
//! }
//! ```

pub mod compare;
pub mod hardlink;
pub mod hasher;
pub mod walker;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// Re-export main types
pub use compare::{ContentComparer, DEFAULT_BUFFER_SIZE};
pub use hardlink::{HardlinkTracker, StorageIdentity};
pub use hasher::{hash_to_hex, Hash, Hasher, PREHASH_SIZE};
pub use walker::{is_hidden_name, Walker};

/// A regular file discovered during a scan.
///
/// The size is captured when the file is discovered. The storage identity
/// is resolved on first request and cached for the lifetime of the record.
#[derive(Debug, Clone)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes at scan time
    pub size: u64,
    identity: OnceLock<Option<StorageIdentity>>,
}

impl FileRecord {
    /// Create a new record with an unresolved storage identity.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            identity: OnceLock::new(),
        }
    }

    /// Create a record whose storage identity is already known.
    #[must_use]
    pub fn with_identity(path: PathBuf, size: u64, identity: Option<StorageIdentity>) -> Self {
        let record = Self::new(path, size);
        let _ = record.identity.set(identity);
        record
    }

    /// Storage identity of the underlying data, resolved lazily.
    ///
    /// Returns `None` when the platform cannot supply one or the file
    /// metadata can no longer be read.
    pub fn storage_identity(&self) -> Option<StorageIdentity> {
        *self
            .identity
            .get_or_init(|| StorageIdentity::from_path(&self.path))
    }

    /// Borrow the path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Skip hidden files and directories (names starting with `.`).
    /// The root directory itself is never filtered.
    pub skip_hidden: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self { skip_hidden: true }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur while reading file content.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// The file disappeared before or during the read.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    /// Classify an I/O error raised while reading `path`.
    pub(crate) fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
