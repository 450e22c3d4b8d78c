//! Command-line interface definitions.
//!
//! # Example
//!
//! ```bash
//! # List duplicates under two trees
//! dupsweep scan ~/Photos /mnt/backup/Photos
//!
//! # JSON for scripting
//! dupsweep scan ~/Downloads --output json
//!
//! # See what keeping the first copy would remove
//! dupsweep scan ~/Downloads --action keep-first --dry-run
//!
//! # Show settings after config file and environment are applied
//! dupsweep config
//! ```

use std::path::PathBuf;

use bytesize::ByteSize;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Exact duplicate file finder.
///
/// Files are grouped by size, then compared byte for byte. Hard links to
/// the same data are never reported as duplicates.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file (defaults to dupsweep.toml in the config directory)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan directories for duplicate files
    Scan(ScanArgs),

    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directories to scan
    #[arg(value_name = "ROOT", required = true)]
    pub roots: Vec<PathBuf>,

    /// Worker threads for content comparison (0 = one per CPU)
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Bytes read per file for each comparison chunk (e.g. 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub buffer_size: Option<usize>,

    /// Split same-size files by a digest of their first bytes before comparing
    #[arg(long)]
    pub prefilter: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// What to do with each duplicate group
    #[arg(long, value_enum, default_value_t = ActionArg::Ignore)]
    pub action: ActionArg,

    /// Destination for --action move-first-to
    #[arg(long, value_name = "PATH", required_if_eq("action", "move-first-to"))]
    pub destination: Option<PathBuf>,

    /// Delete permanently instead of moving to the trash
    #[arg(long)]
    pub permanent: bool,

    /// Show what the action would do without changing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// JSON for scripting
    Json,
}

/// Non-interactive action applied to every group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Only report
    Ignore,
    /// Keep the first file of each group, remove the rest
    KeepFirst,
    /// Move the first file of each group to --destination, remove the rest
    MoveFirstTo,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size such as `4096`, `64KiB` or `1MB`.
///
/// # Examples
///
/// ```
/// use dupsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("64KiB").unwrap(), 65_536);
/// ```
///
/// # Errors
///
/// Returns an error for malformed input or a size of zero.
pub fn parse_size(s: &str) -> Result<usize, String> {
    let parsed: ByteSize = s.trim().parse().map_err(|e| format!("Invalid size '{s}': {e}"))?;
    let bytes = usize::try_from(parsed.as_u64()).map_err(|_| format!("Size too large: '{s}'"))?;
    if bytes == 0 {
        return Err("Size must be at least 1 byte".to_string());
    }
    Ok(bytes)
}
