//! Anchor-and-split partitioning of a size bucket.
//!
//! # Algorithm
//!
//! The first file of the working list is the anchor. Every other file is
//! compared with it; matches join the anchor in a new group and the rest
//! become the next working list. This repeats until fewer than two files
//! remain. Content equality is transitive, so a file confirmed equal to an
//! anchor is never compared again.
//!
//! With every file distinct this costs n(n-1)/2 comparisons, the price of
//! exact partitioning without a digest. The optional pre-filter cuts that
//! down by splitting the bucket on a prefix digest first; the byte
//! comparison still decides membership.

use std::collections::HashMap;

use crate::scanner::{CompareError, ContentComparer, FileRecord, Hash, Hasher};

use super::groups::{DuplicateGroup, SizeBucket};

/// Splits size buckets into groups of byte-identical files.
///
/// One partitioner is owned by one worker at a time; it reuses its read
/// buffers across every comparison.
#[derive(Debug)]
pub struct Partitioner {
    comparer: ContentComparer,
    prefilter: Option<Hasher>,
}

impl Partitioner {
    /// Create a partitioner reading `buffer_size` bytes per chunk.
    #[must_use]
    pub fn new(buffer_size: usize) -> Self {
        Self {
            comparer: ContentComparer::new(buffer_size),
            prefilter: None,
        }
    }

    /// Enable the prefix-digest pre-filter.
    #[must_use]
    pub fn with_prefilter(mut self, hasher: Hasher) -> Self {
        self.prefilter = Some(hasher);
        self
    }

    /// Partition one bucket into maximal groups of identical files.
    ///
    /// Files that match nothing are dropped. Group members keep the bucket's
    /// order, with the anchor first.
    ///
    /// # Errors
    ///
    /// The first read failure aborts the bucket; no partial groups are
    /// returned.
    pub fn partition(&mut self, bucket: SizeBucket) -> Result<Vec<DuplicateGroup>, CompareError> {
        let SizeBucket { size, files } = bucket;

        // Pairs need exactly one comparison and skip the digest.
        let prefilter = self
            .prefilter
            .clone()
            .filter(|_| size > 0 && files.len() > 2);

        match prefilter {
            Some(hasher) => {
                let subsets = split_by_prehash(files, &hasher)?;
                let mut groups = Vec::new();
                for subset in subsets {
                    groups.extend(self.anchor_split(size, subset)?);
                }
                Ok(groups)
            }
            None => self.anchor_split(size, files),
        }
    }

    fn anchor_split(
        &mut self,
        size: u64,
        files: Vec<FileRecord>,
    ) -> Result<Vec<DuplicateGroup>, CompareError> {
        let mut groups = Vec::new();
        let mut remaining = files;

        while remaining.len() >= 2 {
            let mut rest = std::mem::take(&mut remaining).into_iter();
            let Some(anchor) = rest.next() else {
                break;
            };

            let mut matched = vec![anchor];
            for candidate in rest {
                if self.comparer.equal(&matched[0].path, &candidate.path)? {
                    matched.push(candidate);
                } else {
                    remaining.push(candidate);
                }
            }

            if matched.len() > 1 {
                log::trace!(
                    "Anchor {} matched {} file(s)",
                    matched[0].path.display(),
                    matched.len() - 1
                );
                groups.push(DuplicateGroup::new(size, matched));
            }
        }

        Ok(groups)
    }
}

/// Split files on a prefix digest, keeping only subsets of 2+ files.
///
/// Subsets come back ordered by their first member's position in `files`.
fn split_by_prehash(
    files: Vec<FileRecord>,
    hasher: &Hasher,
) -> Result<Vec<Vec<FileRecord>>, CompareError> {
    let mut slots: HashMap<Hash, usize> = HashMap::new();
    let mut subsets: Vec<Vec<FileRecord>> = Vec::new();

    for file in files {
        let digest = hasher.prehash(&file.path)?;
        match slots.get(&digest) {
            Some(&slot) => subsets[slot].push(file),
            None => {
                slots.insert(digest, subsets.len());
                subsets.push(vec![file]);
            }
        }
    }

    let before = subsets.len();
    subsets.retain(|subset| subset.len() > 1);
    log::trace!(
        "Prefilter: {} digest subset(s), {} kept",
        before,
        subsets.len()
    );
    Ok(subsets)
}
