//! Storage identities for hard-link detection.
//!
//! # Overview
//!
//! Hard links are multiple directory entries pointing to the same data on
//! disk. They share content but deleting one of them reclaims nothing, so
//! they must not be reported as duplicates of each other.
//!
//! # Platform Support
//!
//! - **Unix**: Uses (device_id, inode) pairs from file metadata
//! - **Other**: No identity is available; files are never treated as linked
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{HardlinkTracker, StorageIdentity};
//! use std::path::Path;
//!
//! let mut tracker = HardlinkTracker::new();
//! for path in ["a.txt", "b.txt"] {
//!     let identity = StorageIdentity::from_path(Path::new(path));
//!     if tracker.is_hardlink(identity) {
//!         println!("{} shares storage with an earlier file", path);
//!     }
//! }
//! ```

use std::collections::HashSet;
use std::fs::Metadata;
use std::path::Path;

/// Identifier of the physical storage behind a path.
///
/// Two paths with equal identities are the same file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageIdentity {
    device: u64,
    index: u64,
}

impl StorageIdentity {
    /// Build an identity from a device id and a per-device file index.
    #[must_use]
    pub const fn new(device: u64, index: u64) -> Self {
        Self { device, index }
    }

    /// Device (filesystem) the file lives on.
    #[must_use]
    pub const fn device(&self) -> u64 {
        self.device
    }

    /// Inode-equivalent index within the device.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Resolve the identity of `path` without following a final symlink.
    ///
    /// Returns `None` if the metadata cannot be read or the platform has no
    /// notion of a storage identity.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        match std::fs::symlink_metadata(path) {
            Ok(metadata) => Self::from_metadata(&metadata),
            Err(e) => {
                log::warn!(
                    "Cannot read metadata for {}, treating as unlinked: {}",
                    path.display(),
                    e
                );
                None
            }
        }
    }

    /// Extract the identity from already-loaded metadata.
    #[cfg(unix)]
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            device: metadata.dev(),
            index: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    #[must_use]
    pub fn from_metadata(_metadata: &Metadata) -> Option<Self> {
        // Windows exposes the file index only through an open handle
        // (GetFileInformationByHandle), which std does not surface on stable.
        None
    }

    /// Whether this platform can supply storage identities.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

impl std::fmt::Display for StorageIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "dev:{}:ino:{}", self.device, self.index)
    }
}

/// Tracks seen storage identities to detect hard links.
///
/// The first path seen for an identity is the representative; every later
/// path with the same identity is reported as a hard link.
///
/// # Thread Safety
///
/// `HardlinkTracker` is NOT thread-safe. Create one per group being
/// collapsed.
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    seen: HashSet<StorageIdentity>,
}

impl HardlinkTracker {
    /// Create a new hard-link tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
        }
    }

    /// Create a tracker with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
        }
    }

    /// Check whether `identity` was already seen, recording it if not.
    ///
    /// Files without an identity are never reported as hard links.
    pub fn is_hardlink(&mut self, identity: Option<StorageIdentity>) -> bool {
        match identity {
            Some(key) => !self.seen.insert(key),
            None => false,
        }
    }

    /// Number of distinct identities recorded.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
