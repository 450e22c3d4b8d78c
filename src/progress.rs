//! Progress and error notification.
//!
//! The duplicate finder never prints anything itself. Everything a user
//! might want to see is pushed through the [`ScanReporter`] trait, and the
//! presentation layer decides what to do with it. [`Progress`] is the
//! terminal implementation built on indicatif; [`NullReporter`] discards
//! everything.

use std::error::Error;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Phase name used while directories are walked.
pub const PHASE_WALKING: &str = "walking";
/// Phase name used while candidate buckets are compared.
pub const PHASE_COMPARING: &str = "comparing";

/// Receiver of scan notifications.
///
/// Implementations must be cheap: `on_progress` is called from worker
/// threads while the shared result state is locked, which is what keeps the
/// reported counts monotonic.
pub trait ScanReporter: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - [`PHASE_WALKING`] or [`PHASE_COMPARING`]
    /// * `total` - Number of items the phase will process (0 if unknown)
    fn on_phase_start(&self, _phase: &str, _total: usize) {}

    /// Called after each file is discovered during the walk.
    fn on_discovered(&self, _count: usize) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: &str) {}

    /// Called once for every root that does not exist or is not a directory.
    /// The root is skipped and the scan continues.
    fn on_invalid_root(&self, path: &Path);

    /// Called when a fatal failure voids the scan.
    fn on_fatal_io(&self, error: &dyn Error);

    /// Called as buckets complete with the number of candidate files
    /// processed so far. Values never decrease within one scan.
    fn on_progress(&self, processed: usize, total: usize);
}

/// Reporter that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullReporter;

impl ScanReporter for NullReporter {
    fn on_invalid_root(&self, _path: &Path) {}

    fn on_fatal_io(&self, _error: &dyn Error) {}

    fn on_progress(&self, _processed: usize, _total: usize) {}
}

/// Terminal progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    walking: Mutex<Option<ProgressBar>>,
    comparing: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// When `quiet` is set no bars are drawn and invalid roots are not
    /// echoed; fatal errors are still printed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupsweep::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            walking: Mutex::new(None),
            comparing: Mutex::new(None),
            quiet,
        }
    }

    fn walking_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn comparing_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn print(&self, line: String) {
        if self.multi.println(&line).is_err() {
            eprintln!("{}", line);
        }
    }
}

impl ScanReporter for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        match phase {
            PHASE_WALKING => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::walking_style());
                pb.set_message("Walking directories");
                pb.enable_steady_tick(Duration::from_millis(100));
                *self.walking.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
            }
            PHASE_COMPARING => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::comparing_style());
                pb.set_message("Comparing");
                *self.comparing.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
            }
            _ => {}
        }
    }

    fn on_discovered(&self, count: usize) {
        if let Some(ref pb) = *self.walking.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_position(count as u64);
        }
    }

    fn on_phase_end(&self, phase: &str) {
        let slot = match phase {
            PHASE_WALKING => &self.walking,
            PHASE_COMPARING => &self.comparing,
            _ => return,
        };
        if let Some(pb) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
            pb.finish_with_message(format!("{} complete", phase));
        }
    }

    fn on_invalid_root(&self, path: &Path) {
        if !self.quiet {
            self.print(format!(
                "{} isn't a valid directory, ignoring it",
                path.display()
            ));
        }
    }

    fn on_fatal_io(&self, error: &dyn Error) {
        for slot in [&self.walking, &self.comparing] {
            if let Some(pb) = slot.lock().unwrap_or_else(PoisonError::into_inner).take() {
                pb.abandon_with_message("aborted");
            }
        }
        self.print(format!("Scan aborted: {}", error));
    }

    fn on_progress(&self, processed: usize, _total: usize) {
        if let Some(ref pb) = *self.comparing.lock().unwrap_or_else(PoisonError::into_inner) {
            pb.set_position(processed as u64);
        }
    }
}
