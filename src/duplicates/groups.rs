//! Size bucketing and duplicate group types.
//!
//! # Overview
//!
//! Files of different lengths cannot have identical content, so the first
//! step of detection groups files by exact size. Only buckets with two or
//! more members are worth reading; everything else is dropped here without
//! touching file content.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRecord;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/file1.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file2.txt"), 1024),
//!     FileRecord::new(PathBuf::from("/file3.txt"), 2048),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(stats.total_files, 3);
//! assert_eq!(stats.candidate_files, 2);
//! assert_eq!(buckets.len(), 1);
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::scanner::FileRecord;

/// Files sharing one exact byte length.
#[derive(Debug, Clone)]
pub struct SizeBucket {
    /// File size in bytes (shared by all files in this bucket)
    pub size: u64,
    /// Files with this exact size, in discovery order
    pub files: Vec<FileRecord>,
}

impl SizeBucket {
    /// Create a bucket with initial files.
    #[must_use]
    pub fn with_files(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Add a file to this bucket.
    ///
    /// # Panics
    ///
    /// Debug assertion fails if the file size doesn't match the bucket size.
    pub fn add(&mut self, file: FileRecord) {
        debug_assert_eq!(
            file.size, self.size,
            "File size {} doesn't match bucket size {}",
            file.size, self.size
        );
        self.files.push(file);
    }

    /// Number of files in this bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this bucket is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether this bucket could contain duplicates (2+ files).
    #[must_use]
    pub fn is_candidate(&self) -> bool {
        self.files.len() > 1
    }
}

/// Files confirmed to be byte-identical and stored separately.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// File size in bytes, shared by every member
    pub size: u64,
    /// Members in discovery order
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(size: u64, files: Vec<FileRecord>) -> Self {
        Self { size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Whether `path` is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }

    /// Total size of all members.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Number of redundant copies (all members but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Space recovered by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from the size bucketing phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files bucketed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of buckets with 2+ files
    pub candidate_buckets: usize,
    /// Number of files in candidate buckets
    pub candidate_files: usize,
    /// Number of files eliminated because their size is unique
    pub eliminated_unique: usize,
    /// Number of zero-length files seen
    pub empty_files: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size bucketing.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Bucket files by exact size, keeping only candidate buckets.
///
/// Buckets are returned largest size first; files inside a bucket keep the
/// order they were supplied in. Zero-length files are bucketed like any
/// other size.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileRecord;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
///
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a.txt"), 100),
///     FileRecord::new(PathBuf::from("/b.txt"), 100),
///     FileRecord::new(PathBuf::from("/c.txt"), 200),
/// ];
///
/// let (buckets, stats) = group_by_size(files);
///
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[0].size, 100);
/// assert_eq!(stats.eliminated_unique, 1);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (Vec<SizeBucket>, GroupingStats) {
    let mut all_buckets: HashMap<u64, SizeBucket> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        if file.size == 0 {
            stats.empty_files += 1;
        }

        let size = file.size;
        all_buckets
            .entry(size)
            .or_insert_with(|| SizeBucket::with_files(size, Vec::new()))
            .add(file);
    }

    stats.unique_sizes = all_buckets.len();

    let mut candidates: Vec<SizeBucket> = all_buckets
        .into_values()
        .filter(|bucket| {
            if bucket.is_candidate() {
                stats.candidate_buckets += 1;
                stats.candidate_files += bucket.len();
                log::debug!(
                    "Size bucket {} bytes: {} candidates",
                    bucket.size,
                    bucket.len()
                );
                true
            } else {
                stats.eliminated_unique += bucket.len();
                if let Some(only) = bucket.files.first() {
                    log::trace!(
                        "Eliminated unique size {}: {}",
                        bucket.size,
                        only.path.display()
                    );
                }
                false
            }
        })
        .collect();

    candidates.sort_by(|a, b| b.size.cmp(&a.size));

    (candidates, stats)
}
