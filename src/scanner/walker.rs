//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root
//! directory and yielding every regular file below it as a [`FileRecord`].
//!
//! # Features
//!
//! - Parallel directory reading using jwalk's rayon pool
//! - Deterministic output order (children sorted by name)
//! - Hidden entries (`.name`) dropped before descent, so hidden
//!   directories are never entered
//! - Symbolic links are neither followed nor reported
//!
//! Errors are yielded rather than skipped. The caller decides what a
//! failure means; the duplicate finder treats any of them as fatal.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;

use super::{FileRecord, ScanError, WalkerConfig};

/// Whether a directory entry name follows the hidden-entry convention.
#[must_use]
pub fn is_hidden_name(name: &OsStr) -> bool {
    name.to_str().map_or_else(
        || name.to_string_lossy().starts_with('.'),
        |s| s.starts_with('.'),
    )
}

/// Directory walker for file discovery under a single root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupsweep::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// ```
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that the root exists and is a directory.
    ///
    /// # Errors
    ///
    /// [`ScanError::NotFound`] or [`ScanError::NotADirectory`].
    pub fn validate_root(&self) -> Result<(), ScanError> {
        if !self.root.exists() {
            return Err(ScanError::NotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// The iterator is lazy: directories are read as it is consumed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dupsweep::scanner::{Walker, WalkerConfig};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), WalkerConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        // jwalk's own skip_hidden is bypassed so the filter is explicit.
        // The root arrives as the only child of a depth-less read, which
        // must never be filtered.
        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(false)
            .process_read_dir(move |depth, _path, _read_dir_state, children| {
                if skip_hidden && depth.is_some() {
                    children.retain(|child| {
                        child
                            .as_ref()
                            .map_or(true, |entry| !is_hidden_name(entry.file_name()))
                    });
                }
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name().cmp(b.file_name()),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });
            });

        walk_dir.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) => {
                // Skip the root directory itself
                if entry.depth == 0 {
                    return None;
                }

                let path = entry.path();
                let file_type = entry.file_type();

                if file_type.is_dir() {
                    return None;
                }
                if file_type.is_symlink() {
                    log::trace!("Skipping symlink: {}", path.display());
                    return None;
                }

                let metadata = match std::fs::symlink_metadata(&path) {
                    Ok(m) => m,
                    Err(e) => return Some(Err(self.handle_io_error(&path, e))),
                };

                if !metadata.is_file() {
                    log::trace!("Skipping non-regular file: {}", path.display());
                    return None;
                }

                Some(Ok(FileRecord::new(path, metadata.len())))
            }
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                Some(Err(self.handle_jwalk_error(path, e)))
            }
        })
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::warn!("File vanished during scan: {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> ScanError {
        log::warn!("Walker error for {}: {}", path.display(), error);
        ScanError::Io {
            path,
            source: std::io::Error::other(error.to_string()),
        }
    }
}
