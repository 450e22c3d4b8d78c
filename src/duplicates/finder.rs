//! Duplicate finder orchestrating the detection pipeline.
//!
//! # Pipeline
//!
//! 1. **Walk** - Collect regular, non-hidden files under every valid root
//! 2. **Bucket** - Group by exact size and drop unique sizes
//! 3. **Partition** - Split each candidate bucket into groups of
//!    byte-identical files, one pool task per bucket
//! 4. **Collapse** - Drop hard-linked members inside each group
//!
//! Any read failure during steps 1 or 3 voids the whole run. Invalid roots
//! are reported and skipped.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use crate::progress::{NullReporter, ScanReporter, PHASE_COMPARING, PHASE_WALKING};
use crate::scanner::{
    CompareError, FileRecord, Hasher, ScanError, Walker, WalkerConfig, DEFAULT_BUFFER_SIZE,
};

use super::collapse::collapse_hardlinks;
use super::engine::{run_buckets, RunOptions};
use super::groups::{group_by_size, DuplicateGroup};

/// Default number of bounded waits for the worker pool to finish.
pub const DEFAULT_WAIT_RETRIES: u32 = 3;

/// Default length of each bounded wait.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Worker threads for content comparison; 0 uses host parallelism.
    pub threads: usize,
    /// Bytes read per side for each comparison chunk.
    pub buffer_size: usize,
    /// Number of bounded waits before the run is declared stuck.
    pub wait_retries: u32,
    /// Length of each bounded wait.
    pub wait_timeout: Duration,
    /// Prefix length for the digest pre-filter, if enabled.
    pub prefilter: Option<usize>,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Receiver of progress and error notifications.
    pub reporter: Arc<dyn ScanReporter>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("threads", &self.threads)
            .field("buffer_size", &self.buffer_size)
            .field("wait_retries", &self.wait_retries)
            .field("wait_timeout", &self.wait_timeout)
            .field("prefilter", &self.prefilter)
            .field("walker_config", &self.walker_config)
            .field("reporter", &"<reporter>")
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
            wait_retries: DEFAULT_WAIT_RETRIES,
            wait_timeout: DEFAULT_WAIT_TIMEOUT,
            prefilter: None,
            walker_config: WalkerConfig::default(),
            reporter: Arc::new(NullReporter),
        }
    }
}

impl FinderConfig {
    /// Set the worker thread count (0 = host parallelism).
    #[must_use]
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the comparison chunk size in bytes.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set how long, and how many times, to wait for the pool to finish.
    #[must_use]
    pub fn with_wait_policy(mut self, retries: u32, timeout: Duration) -> Self {
        self.wait_retries = retries.max(1);
        self.wait_timeout = timeout;
        self
    }

    /// Enable the digest pre-filter over the first `prefix_len` bytes, or
    /// disable it with `None`.
    #[must_use]
    pub fn with_prefilter(mut self, prefix_len: Option<usize>) -> Self {
        self.prefilter = prefix_len.map(|len| len.max(1));
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the notification receiver.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn ScanReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Thread count actually used for the worker pool.
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        if self.threads > 0 {
            self.threads
        } else {
            std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get)
        }
    }

    fn run_options(&self) -> RunOptions {
        RunOptions {
            threads: self.effective_threads(),
            buffer_size: self.buffer_size,
            prefilter: self.prefilter.map(Hasher::with_prefix_len),
            wait_retries: self.wait_retries,
            wait_timeout: self.wait_timeout,
        }
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Roots skipped because they were missing or not directories
    pub invalid_roots: usize,
    /// Files sharing their size with at least one other file
    pub candidate_files: usize,
    /// Size buckets holding 2+ files
    pub candidate_buckets: usize,
    /// Files eliminated because their size was unique
    pub eliminated_by_size: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Number of redundant copies (group members beyond the first)
    pub duplicate_files: usize,
    /// Hard-linked paths dropped from groups
    pub hardlinks_collapsed: usize,
    /// Space recovered by keeping one copy per group
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Percentage of the scanned bytes held by redundant copies.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Reclaimable space as a human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }

    /// Total scanned size as a human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize::b(self.total_size).to_string()
    }
}

/// Errors that void a duplicate scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Walking a root failed.
    #[error("Scan failed: {0}")]
    Scan(#[from] ScanError),

    /// Reading file content failed.
    #[error("Comparison failed: {0}")]
    Compare(#[from] CompareError),

    /// The worker pool did not confirm completion in time.
    #[error("Workers did not finish after {attempts} wait(s), unexpected termination")]
    TerminationTimeout {
        /// Number of bounded waits performed
        attempts: u32,
    },

    /// The run was aborted without a recorded cause.
    #[error("Scan aborted")]
    Aborted,

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Duplicate finder running the full detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::PathBuf;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_threads(4));
/// let (groups, summary) = finder.find_duplicates(&[PathBuf::from(".")]).unwrap();
///
/// println!("Found {} duplicate groups", groups.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under the given roots.
    ///
    /// Roots that are missing or not directories are reported and skipped.
    /// A path reachable from more than one root is considered once.
    ///
    /// Groups are ordered by descending size, then by first path. Members
    /// keep discovery order.
    ///
    /// # Errors
    ///
    /// Any walk or read failure, or a worker pool that does not finish in
    /// time. No groups are returned in that case.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let reporter = &self.config.reporter;

        log::info!("Phase 0: Walking {} root(s)...", roots.len());
        reporter.on_phase_start(PHASE_WALKING, 0);

        let mut invalid_roots = 0;
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut files = Vec::new();

        for root in roots {
            let walker = Walker::new(root, self.config.walker_config.clone());
            if let Err(e) = walker.validate_root() {
                log::warn!("Skipping root {}: {}", root.display(), e);
                reporter.on_invalid_root(root);
                invalid_roots += 1;
                continue;
            }

            let walker = match std::fs::canonicalize(root) {
                Ok(canonical) => Walker::new(&canonical, self.config.walker_config.clone()),
                Err(source) => {
                    return Err(self.walk_failed(ScanError::Io {
                        path: root.clone(),
                        source,
                    }))
                }
            };
            log::debug!("Walking {}", walker.root().display());
            self.absorb_walk(walker.walk(), &mut seen, &mut files)?;
        }

        reporter.on_phase_end(PHASE_WALKING);
        log::info!("Walk complete: {} file(s)", files.len());

        let (groups, mut summary) = self.find_duplicates_from_files(files)?;
        summary.invalid_roots = invalid_roots;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete in {:.2?}: {} group(s), {} reclaimable",
            summary.scan_duration,
            summary.duplicate_groups,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }

    /// Find duplicates among an already collected file list.
    ///
    /// Runs bucketing, partitioning and hard-link collapsing. Files are
    /// taken in the given order, which decides anchor and member order.
    ///
    /// # Errors
    ///
    /// Any read failure, or a worker pool that does not finish in time.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRecord>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();
        let reporter = &self.config.reporter;
        let mut summary = ScanSummary::default();

        log::info!("Phase 1: Grouping {} file(s) by size...", files.len());
        let (buckets, stats) = group_by_size(files);

        summary.total_files = stats.total_files;
        summary.total_size = stats.total_size;
        summary.candidate_files = stats.candidate_files;
        summary.candidate_buckets = stats.candidate_buckets;
        summary.eliminated_by_size = stats.eliminated_unique;

        log::info!(
            "Phase 1 complete: {} candidate(s) in {} bucket(s), {:.1}% eliminated",
            stats.candidate_files,
            stats.candidate_buckets,
            stats.elimination_rate()
        );

        if buckets.is_empty() {
            log::info!("No files share a size, nothing to compare");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        log::info!("Phase 2: Comparing content...");
        reporter.on_phase_start(PHASE_COMPARING, stats.candidate_files);
        let output = run_buckets(
            buckets,
            stats.candidate_files,
            &self.config.run_options(),
            reporter,
        )?;
        reporter.on_phase_end(PHASE_COMPARING);
        log::info!(
            "Phase 2 complete: {} file(s) compared, {} raw group(s)",
            output.processed,
            output.groups.len()
        );

        log::info!("Phase 3: Collapsing hard links...");
        let (mut groups, collapse) = collapse_hardlinks(output.groups);
        summary.hardlinks_collapsed = collapse.collapsed_files;
        if collapse.collapsed_files > 0 {
            log::info!(
                "Phase 3 complete: {} hard link(s) collapsed, {} group(s) dropped",
                collapse.collapsed_files,
                collapse.dropped_groups
            );
        }

        groups.sort_by(|a, b| {
            let first = |g: &DuplicateGroup| g.files.first().map(|f| f.path.clone());
            b.size.cmp(&a.size).then_with(|| first(a).cmp(&first(b)))
        });

        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        Ok((groups, summary))
    }

    /// Append newly seen files from one root's walk.
    ///
    /// The first walk error ends the scan.
    fn absorb_walk(
        &self,
        entries: impl Iterator<Item = Result<FileRecord, ScanError>>,
        seen: &mut HashSet<PathBuf>,
        files: &mut Vec<FileRecord>,
    ) -> Result<(), FinderError> {
        for entry in entries {
            match entry {
                Ok(file) => {
                    if seen.insert(file.path.clone()) {
                        files.push(file);
                        self.config.reporter.on_discovered(files.len());
                    } else {
                        log::trace!("Already seen: {}", file.path.display());
                    }
                }
                Err(e) => return Err(self.walk_failed(e)),
            }
        }
        Ok(())
    }

    fn walk_failed(&self, error: ScanError) -> FinderError {
        log::error!("Aborting scan: {}", error);
        self.config.reporter.on_fatal_io(&error);
        FinderError::Scan(error)
    }
}
