//! Hard-link collapsing for confirmed duplicate groups.
//!
//! Hard-linked paths pass the content comparison trivially, but removing
//! one of them frees nothing. Within each group only the first path seen
//! for a storage identity is kept. Groups left with fewer than two members
//! are dropped. Identities are compared inside a group only.

use crate::scanner::HardlinkTracker;

use super::groups::DuplicateGroup;

/// Counters from a collapsing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollapseStats {
    /// Paths removed because they share storage with an earlier member
    pub collapsed_files: usize,
    /// Groups dropped because fewer than two members remained
    pub dropped_groups: usize,
}

/// Remove hard-linked members from every group.
///
/// Members without a storage identity are always kept.
#[must_use]
pub fn collapse_hardlinks(groups: Vec<DuplicateGroup>) -> (Vec<DuplicateGroup>, CollapseStats) {
    let mut stats = CollapseStats::default();

    let kept = groups
        .into_iter()
        .filter_map(|group| {
            let DuplicateGroup { size, files } = group;
            let mut tracker = HardlinkTracker::with_capacity(files.len());
            let before = files.len();

            let files: Vec<_> = files
                .into_iter()
                .filter(|file| {
                    if tracker.is_hardlink(file.storage_identity()) {
                        log::debug!("Collapsing hard link: {}", file.path.display());
                        false
                    } else {
                        true
                    }
                })
                .collect();

            stats.collapsed_files += before - files.len();

            if files.len() < 2 {
                stats.dropped_groups += 1;
                log::debug!(
                    "Dropping group of {} byte file(s): only hard links of one file",
                    size
                );
                None
            } else {
                Some(DuplicateGroup::new(size, files))
            }
        })
        .collect();

    (kept, stats)
}
