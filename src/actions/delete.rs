//! Single-file removal and relocation.
//!
//! Removal goes to the system trash by default through the trash crate;
//! permanent deletion has to be asked for explicitly.
//!
//! ```no_run
//! use dupsweep::actions::delete::delete_to_trash;
//! use std::path::Path;
//!
//! match delete_to_trash(Path::new("/path/to/duplicate.txt")) {
//!     Ok(result) => println!("Moved to trash: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for file actions.
#[derive(Debug, Error)]
pub enum ActionError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when touching the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The chosen file is not part of the duplicate group.
    #[error("{0} is not a member of this duplicate group")]
    NotAMember(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// Moving a file to its new location failed.
    #[error("failed to move {path} to {destination}: {source}")]
    MoveFailed {
        path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory destination already holds a file of the same name.
    #[error("cannot move {path}: {target} already exists")]
    TargetExists { path: PathBuf, target: PathBuf },

    /// The move destination is itself one of the group's files.
    #[error("destination {0} is a member of this duplicate group")]
    DestinationInGroup(PathBuf),

    /// The platform opener could not be launched.
    #[error("failed to open {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ActionError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAMember(p)
            | Self::DestinationInGroup(p)
            | Self::TargetExists { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::MoveFailed { path: p, .. }
            | Self::OpenFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the removed file in bytes.
    pub size: u64,
    /// Whether removal was permanent (true) or to trash (false).
    pub permanent: bool,
}

fn file_size(path: &Path) -> Result<u64, ActionError> {
    fs::symlink_metadata(path)
        .map(|m| m.len())
        .map_err(|e| ActionError::from_io(path, e))
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// `NotFound` or `PermissionDenied` if the file cannot be inspected,
/// `TrashFailed` if the trash rejects it.
pub fn delete_to_trash(path: &Path) -> Result<RemovalResult, ActionError> {
    let size = file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        ActionError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(RemovalResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Permanently delete a single file.
///
/// # Errors
///
/// `NotFound` or `PermissionDenied` if the file cannot be inspected,
/// `PermanentDeleteFailed` if removal fails.
pub fn permanent_delete(path: &Path) -> Result<RemovalResult, ActionError> {
    let size = file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        ActionError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(RemovalResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Remove a file, to the trash unless `permanent` is set.
///
/// # Errors
///
/// See [`delete_to_trash`] and [`permanent_delete`].
pub fn remove_file(path: &Path, permanent: bool) -> Result<RemovalResult, ActionError> {
    if permanent {
        permanent_delete(path)
    } else {
        delete_to_trash(path)
    }
}

/// Resolve where a file moved to `destination` ends up.
///
/// An existing directory receives the file under its current name; any
/// other destination is taken as the new file path.
#[must_use]
pub fn resolve_destination(path: &Path, destination: &Path) -> PathBuf {
    match path.file_name() {
        Some(name) if destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    }
}

/// Move a file to `destination`.
///
/// An explicit file destination is replaced. A directory destination never
/// has an existing entry overwritten. Falls back to copy and remove when a
/// rename is not possible, for example across filesystems.
///
/// # Errors
///
/// `TargetExists` if the directory already holds a file of that name,
/// `MoveFailed` if neither a rename nor a copy succeeds.
pub fn move_file(path: &Path, destination: &Path) -> Result<PathBuf, ActionError> {
    let target = resolve_destination(path, destination);
    if destination.is_dir() && fs::symlink_metadata(&target).is_ok() {
        return Err(ActionError::TargetExists {
            path: path.to_path_buf(),
            target,
        });
    }
    let failed = |source: io::Error| ActionError::MoveFailed {
        path: path.to_path_buf(),
        destination: target.clone(),
        source,
    };

    if let Err(rename_err) = fs::rename(path, &target) {
        if !path.exists() {
            return Err(failed(rename_err));
        }
        log::debug!(
            "Rename of {} failed ({}), copying instead",
            path.display(),
            rename_err
        );
        fs::copy(path, &target).map_err(failed)?;
        fs::remove_file(path).map_err(failed)?;
    }

    log::info!("Moved {} to {}", path.display(), target.display());
    Ok(target)
}

/// Launch the platform's default application for `path`.
///
/// The opener runs detached; only a failure to start it is reported.
///
/// # Errors
///
/// `OpenFailed` if the opener process cannot be spawned.
pub fn open_file(path: &Path) -> Result<(), ActionError> {
    opener_command(path)
        .spawn()
        .map(|_| log::debug!("Opened {}", path.display()))
        .map_err(|source| ActionError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(target_os = "macos")]
fn opener_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(windows)]
fn opener_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", windows)))]
fn opener_command(path: &Path) -> std::process::Command {
    let mut cmd = std::process::Command::new("xdg-open");
    cmd.arg(path);
    cmd
}
