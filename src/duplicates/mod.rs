//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file bucketing
//! - Anchor-and-split partitioning of candidate buckets
//! - Hard-link collapsing of confirmed groups
//! - Concurrent orchestration with fail-fast error handling

pub mod collapse;
mod engine;
pub mod finder;
pub mod groups;
pub mod partition;

pub use collapse::{collapse_hardlinks, CollapseStats};
pub use finder::{
    DuplicateFinder, FinderConfig, FinderError, ScanSummary, DEFAULT_WAIT_RETRIES,
    DEFAULT_WAIT_TIMEOUT,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeBucket};
pub use partition::Partitioner;
