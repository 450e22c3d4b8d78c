//! File actions module.
//!
//! This module provides functionality for:
//! - Safe removal via the trash crate
//! - Permanent deletion (explicit opt-in)
//! - Relocating a kept copy
//! - Opening files with the platform's default application
//!
//! A duplicate group and a [`Decision`] go in, an [`ActionReport`] comes
//! out:
//!
//! ```no_run
//! use dupsweep::actions::{ActionConfig, ActionExecutor, Decision};
//! use dupsweep::duplicates::DuplicateFinder;
//! use std::path::PathBuf;
//!
//! let (groups, _) = DuplicateFinder::with_defaults()
//!     .find_duplicates(&[PathBuf::from(".")])
//!     .unwrap();
//!
//! let executor = ActionExecutor::new(ActionConfig::trash().with_dry_run(true));
//! for group in &groups {
//!     let report = executor.apply(group, &Decision::Delete).unwrap();
//!     println!("{}", report.summary());
//! }
//! ```

pub mod delete;
pub mod executor;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, move_file, open_file, permanent_delete, remove_file, ActionError,
    RemovalResult,
};
pub use executor::{ActionConfig, ActionExecutor, ActionReport, Decision};
