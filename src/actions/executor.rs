//! Applying a caller's decision to one duplicate group.
//!
//! The engine only reports groups. What happens to them is a plain
//! [`Decision`] value handed to an [`ActionExecutor`], which performs the
//! filesystem work and records every outcome in an [`ActionReport`]. A
//! failure on one file never stops the remaining files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateGroup;

use super::delete::{move_file, open_file, remove_file, resolve_destination, ActionError};

/// What to do with a duplicate group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Leave every file in place.
    Ignore,
    /// Keep the first member, remove the rest.
    Delete,
    /// Keep the given member, remove the rest.
    KeepChosen(PathBuf),
    /// Move the first member to the given location, remove the rest.
    MoveAndDeleteRest(PathBuf),
    /// Open every member with the platform's default application.
    Open,
}

/// How removals are carried out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionConfig {
    /// Delete permanently instead of moving to the trash.
    pub permanent: bool,
    /// Record what would happen without touching the filesystem.
    pub dry_run: bool,
}

impl ActionConfig {
    /// Configuration that moves removed files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Configuration that deletes removed files permanently.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            permanent: true,
            dry_run: false,
        }
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Outcome of applying one or more decisions.
#[derive(Debug, Clone, Default)]
pub struct ActionReport {
    /// Files removed (or that would be removed in a dry run).
    pub removed: Vec<PathBuf>,
    /// Files moved, as (from, to).
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Files handed to the platform opener.
    pub opened: Vec<PathBuf>,
    /// Per-file failures with their messages.
    pub failures: Vec<(PathBuf, String)>,
    /// Bytes freed by removals.
    pub bytes_freed: u64,
    /// Whether this report describes a dry run.
    pub dry_run: bool,
}

impl ActionReport {
    fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Number of successful file operations.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.removed.len() + self.moved.len() + self.opened.len()
    }

    /// Number of failed file operations.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Whether every operation succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ActionReport) {
        self.removed.extend(other.removed);
        self.moved.extend(other.moved);
        self.opened.extend(other.opened);
        self.failures.extend(other.failures);
        self.bytes_freed += other.bytes_freed;
        self.dry_run |= other.dry_run;
    }

    /// One-line human readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let prefix = if self.dry_run { "Would remove" } else { "Removed" };
        let mut line = format!(
            "{} {} file(s), freeing {}",
            prefix,
            self.removed.len(),
            bytesize::ByteSize::b(self.bytes_freed)
        );
        if !self.moved.is_empty() {
            line.push_str(&format!(", moved {}", self.moved.len()));
        }
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failure(s)", self.failures.len()));
        }
        line
    }

    fn fail(&mut self, error: &ActionError) {
        log::warn!("{}", error);
        self.failures
            .push((error.path().to_path_buf(), error.to_string()));
    }
}

/// Applies decisions to duplicate groups.
#[derive(Debug, Clone, Default)]
pub struct ActionExecutor {
    config: ActionConfig,
}

impl ActionExecutor {
    /// Create an executor with the given configuration.
    #[must_use]
    pub fn new(config: ActionConfig) -> Self {
        Self { config }
    }

    /// Configuration this executor uses.
    #[must_use]
    pub fn config(&self) -> &ActionConfig {
        &self.config
    }

    /// Apply `decision` to `group`.
    ///
    /// # Errors
    ///
    /// [`ActionError::NotAMember`] if `KeepChosen` names a path outside
    /// the group, [`ActionError::DestinationInGroup`] if a move would land
    /// on one of the group's files. Nothing is touched in either case.
    /// Per-file failures are collected in the report instead.
    pub fn apply(
        &self,
        group: &DuplicateGroup,
        decision: &Decision,
    ) -> Result<ActionReport, ActionError> {
        let mut report = ActionReport::new(self.config.dry_run);
        let paths = group.paths();

        match decision {
            Decision::Ignore => {
                log::debug!("Ignoring group of {} file(s)", paths.len());
            }
            Decision::Delete => {
                self.remove_all(paths.iter().skip(1), group.size, &mut report);
            }
            Decision::KeepChosen(keep) => {
                if !group.contains(keep) {
                    return Err(ActionError::NotAMember(keep.clone()));
                }
                let rest = paths.iter().filter(|p| p.as_path() != keep.as_path());
                self.remove_all(rest, group.size, &mut report);
            }
            Decision::MoveAndDeleteRest(destination) => {
                let Some(first) = paths.first() else {
                    return Ok(report);
                };
                let target = resolve_destination(first, destination);
                if lands_on_member(group, &target) {
                    return Err(ActionError::DestinationInGroup(target));
                }
                if self.relocate(first, destination, &mut report) {
                    self.remove_all(paths.iter().skip(1), group.size, &mut report);
                } else {
                    log::warn!(
                        "Keeping the other copies of {} since it was not moved",
                        first.display()
                    );
                }
            }
            Decision::Open => {
                for path in &paths {
                    if self.config.dry_run {
                        report.opened.push(path.clone());
                        continue;
                    }
                    match open_file(path) {
                        Ok(()) => report.opened.push(path.clone()),
                        Err(e) => report.fail(&e),
                    }
                }
            }
        }

        Ok(report)
    }

    fn remove_all<'a>(
        &self,
        paths: impl Iterator<Item = &'a PathBuf>,
        size: u64,
        report: &mut ActionReport,
    ) {
        for path in paths {
            if self.config.dry_run {
                log::info!("Would remove: {}", path.display());
                report.removed.push(path.clone());
                report.bytes_freed += size;
                continue;
            }
            match remove_file(path, self.config.permanent) {
                Ok(result) => {
                    report.bytes_freed += result.size;
                    report.removed.push(result.path);
                }
                Err(e) => report.fail(&e),
            }
        }
    }

    /// Returns whether the file reached (or would reach) its destination.
    fn relocate(&self, path: &Path, destination: &Path, report: &mut ActionReport) -> bool {
        if self.config.dry_run {
            let target = resolve_destination(path, destination);
            if destination.is_dir() && target.exists() {
                report.fail(&ActionError::TargetExists {
                    path: path.to_path_buf(),
                    target,
                });
                return false;
            }
            log::info!("Would move {} to {}", path.display(), target.display());
            report.moved.push((path.to_path_buf(), target));
            return true;
        }
        match move_file(path, destination) {
            Ok(target) => {
                report.moved.push((path.to_path_buf(), target));
                true
            }
            Err(e) => {
                report.fail(&e);
                false
            }
        }
    }
}

fn lands_on_member(group: &DuplicateGroup, target: &Path) -> bool {
    if group.contains(target) {
        return true;
    }
    let Ok(target) = fs::canonicalize(target) else {
        return false;
    };
    group
        .files
        .iter()
        .any(|f| fs::canonicalize(&f.path).is_ok_and(|member| member == target))
}
