//! Bucket scheduling and result aggregation.
//!
//! Every candidate bucket becomes one task on a bounded rayon pool. Tasks
//! read file content with no lock held, then enter a single critical
//! section to publish their groups and advance the processed counter. The
//! first failure sets the abort flag inside that same section, so nothing
//! can be published after it and exactly one failure is reported.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::progress::ScanReporter;
use crate::scanner::{CompareError, Hasher};

use super::groups::{DuplicateGroup, SizeBucket};
use super::partition::Partitioner;
use super::FinderError;

/// Tunables for one comparison run.
#[derive(Debug, Clone)]
pub(crate) struct RunOptions {
    pub threads: usize,
    pub buffer_size: usize,
    pub prefilter: Option<Hasher>,
    pub wait_retries: u32,
    pub wait_timeout: Duration,
}

/// Per-run coordination state, only ever touched under the mutex.
#[derive(Debug, Default)]
struct EngineState {
    groups: Vec<DuplicateGroup>,
    processed: usize,
    aborted: bool,
    failure: Option<CompareError>,
    pending: usize,
}

struct Shared {
    state: Mutex<EngineState>,
    done: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Groups and processed count from a run that completed without failure.
#[derive(Debug)]
pub(crate) struct RunOutput {
    pub groups: Vec<DuplicateGroup>,
    pub processed: usize,
}

/// Partition all buckets on a worker pool.
///
/// Returns every group found, or the error that voided the run. Nothing
/// partial is ever returned.
pub(crate) fn run_buckets(
    buckets: Vec<SizeBucket>,
    total_files: usize,
    options: &RunOptions,
    reporter: &Arc<dyn ScanReporter>,
) -> Result<RunOutput, FinderError> {
    let threads = options.threads.max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("dupsweep-worker-{}", i))
        .build()
        .map_err(|e| FinderError::ThreadPool(e.to_string()))?;

    log::info!(
        "Comparing {} bucket(s) holding {} file(s) on {} thread(s)",
        buckets.len(),
        total_files,
        threads
    );

    let shared = Arc::new(Shared {
        state: Mutex::new(EngineState::default()),
        done: Condvar::new(),
    });

    for bucket in buckets {
        {
            let mut state = shared.lock();
            if state.aborted {
                log::debug!("Abort observed, not scheduling remaining buckets");
                break;
            }
            state.pending += 1;
        }

        let shared = Arc::clone(&shared);
        let reporter = Arc::clone(reporter);
        let mut partitioner = Partitioner::new(options.buffer_size);
        if let Some(ref hasher) = options.prefilter {
            partitioner = partitioner.with_prefilter(hasher.clone());
        }

        pool.spawn(move || {
            process_bucket(bucket, partitioner, &shared, reporter.as_ref(), total_files);
        });
    }

    wait_for_workers(&shared, options, reporter.as_ref())?;

    let mut state = shared.lock();
    if state.aborted {
        return Err(match state.failure.take() {
            Some(e) => FinderError::Compare(e),
            None => FinderError::Aborted,
        });
    }

    Ok(RunOutput {
        groups: std::mem::take(&mut state.groups),
        processed: state.processed,
    })
}

/// Worker body for one bucket.
fn process_bucket(
    bucket: SizeBucket,
    mut partitioner: Partitioner,
    shared: &Shared,
    reporter: &dyn ScanReporter,
    total_files: usize,
) {
    let members = bucket.len();
    let size = bucket.size;

    let skip = shared.lock().aborted;
    let outcome = if skip {
        None
    } else {
        Some(partitioner.partition(bucket))
    };

    let mut state = shared.lock();
    match outcome {
        None => log::trace!("Skipping {} byte bucket after abort", size),
        Some(Ok(groups)) if !state.aborted => {
            log::debug!(
                "Bucket {} bytes: {} file(s) -> {} group(s)",
                size,
                members,
                groups.len()
            );
            state.groups.extend(groups);
            state.processed += members;
            reporter.on_progress(state.processed, total_files);
        }
        Some(Ok(_)) => log::debug!("Discarding {} byte bucket finished after abort", size),
        Some(Err(e)) => {
            if state.aborted {
                log::warn!("Additional failure after abort: {}", e);
            } else {
                log::error!("Aborting scan: {}", e);
                state.aborted = true;
                reporter.on_fatal_io(&e);
                state.failure = Some(e);
            }
        }
    }

    state.pending -= 1;
    drop(state);
    shared.done.notify_all();
}

/// Block until every scheduled task has finished or the retry budget runs out.
fn wait_for_workers(
    shared: &Shared,
    options: &RunOptions,
    reporter: &dyn ScanReporter,
) -> Result<(), FinderError> {
    let retries = options.wait_retries.max(1);
    let mut state = shared.lock();
    let mut attempts = 0;

    while state.pending > 0 {
        if attempts == retries {
            state.aborted = true;
            drop(state);

            let err = FinderError::TerminationTimeout { attempts };
            log::error!("{}", err);
            reporter.on_fatal_io(&err);
            return Err(err);
        }
        attempts += 1;

        let (guard, result) = shared
            .done
            .wait_timeout_while(state, options.wait_timeout, |s| s.pending > 0)
            .unwrap_or_else(PoisonError::into_inner);
        state = guard;

        if result.timed_out() && state.pending > 0 {
            log::warn!(
                "Wait {}/{} timed out with {} bucket(s) still running",
                attempts,
                retries,
                state.pending
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullReporter;
    use crate::scanner::FileRecord;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Recorder {
        fatal: AtomicUsize,
        progress: Mutex<Vec<usize>>,
    }

    impl ScanReporter for Recorder {
        fn on_invalid_root(&self, _path: &Path) {}

        fn on_fatal_io(&self, _error: &dyn std::error::Error) {
            self.fatal.fetch_add(1, Ordering::SeqCst);
        }

        fn on_progress(&self, processed: usize, _total: usize) {
            self.progress.lock().unwrap().push(processed);
        }
    }

    fn options(threads: usize) -> RunOptions {
        RunOptions {
            threads,
            buffer_size: 8,
            prefilter: None,
            wait_retries: 3,
            wait_timeout: Duration::from_secs(60),
        }
    }

    fn pair_bucket(dir: &TempDir, size: usize) -> SizeBucket {
        let content = vec![b'z'; size];
        let files = (0..2)
            .map(|i| {
                let path = dir.path().join(format!("{}-{}", size, i));
                std::fs::write(&path, &content).unwrap();
                FileRecord::new(path, size as u64)
            })
            .collect();
        SizeBucket::with_files(size as u64, files)
    }

    #[test]
    fn test_run_collects_all_groups() {
        let dir = TempDir::new().unwrap();
        let buckets: Vec<_> = (1..=6).map(|size| pair_bucket(&dir, size)).collect();

        let recorder = Arc::new(Recorder::default());
        let reporter: Arc<dyn ScanReporter> = recorder.clone();
        let output = run_buckets(buckets, 12, &options(3), &reporter).unwrap();

        assert_eq!(output.groups.len(), 6);
        assert_eq!(output.processed, 12);
        assert_eq!(recorder.fatal.load(Ordering::SeqCst), 0);

        let progress = recorder.progress.lock().unwrap().clone();
        assert_eq!(progress.len(), 6);
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(progress.last(), Some(&12));
    }

    #[test]
    fn test_run_with_no_buckets() {
        let reporter: Arc<dyn ScanReporter> = Arc::new(NullReporter);
        let output = run_buckets(Vec::new(), 0, &options(2), &reporter).unwrap();
        assert!(output.groups.is_empty());
        assert_eq!(output.processed, 0);
    }

    #[test]
    fn test_failures_reported_once() {
        let dir = TempDir::new().unwrap();
        let mut buckets: Vec<_> = (1..=4).map(|size| pair_bucket(&dir, size)).collect();
        for size in [100u64, 200, 300] {
            buckets.push(SizeBucket::with_files(
                size,
                vec![
                    FileRecord::new(dir.path().join(format!("ghost-a-{}", size)), size),
                    FileRecord::new(dir.path().join(format!("ghost-b-{}", size)), size),
                ],
            ));
        }

        let recorder = Arc::new(Recorder::default());
        let reporter: Arc<dyn ScanReporter> = recorder.clone();
        let result = run_buckets(buckets, 14, &options(4), &reporter);

        assert!(matches!(result, Err(FinderError::Compare(_))));
        assert_eq!(recorder.fatal.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_termination_timeout() {
        let dir = TempDir::new().unwrap();
        let bucket = pair_bucket(&dir, 4);

        let shared = Shared {
            state: Mutex::new(EngineState {
                pending: 1,
                ..Default::default()
            }),
            done: Condvar::new(),
        };
        let opts = RunOptions {
            wait_retries: 2,
            wait_timeout: Duration::from_millis(10),
            ..options(1)
        };

        let recorder = Recorder::default();
        let result = wait_for_workers(&shared, &opts, &recorder);

        assert!(matches!(
            result,
            Err(FinderError::TerminationTimeout { attempts: 2 })
        ));
        assert_eq!(recorder.fatal.load(Ordering::SeqCst), 1);
        assert!(shared.lock().aborted);

        // A straggler finishing after the timeout must not publish anything.
        process_bucket(bucket, Partitioner::new(8), &shared, &recorder, 2);
        let state = shared.lock();
        assert!(state.groups.is_empty());
        assert_eq!(state.pending, 0);
    }
}
