//! dupsweep - exact duplicate file finder
//!
//! Finds groups of byte-identical files across one or more directory trees.
//! Candidates are narrowed by size, then compared chunk by chunk; hashes
//! are never taken as proof of equality. Hard links to the same data are
//! not reported, and any read failure voids the run instead of producing a
//! partial report.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{ensure, Context, Result};

use crate::actions::{ActionConfig, ActionExecutor, ActionReport, Decision};
use crate::cli::{ActionArg, Cli, Commands, OutputFormat, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, DuplicateGroup};
use crate::error::ExitCode;
use crate::output::{JsonOutput, TextOutput};
use crate::progress::{NullReporter, Progress, ScanReporter};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Configuration problems, a voided scan, or failure to write the report.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => run_scan(args, config, cli.quiet),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(ExitCode::Success)
        }
    }
}

fn run_scan(args: ScanArgs, mut config: Config, quiet: bool) -> Result<ExitCode> {
    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(size) = args.buffer_size {
        config.buffer_size = size;
    }
    config.prefilter |= args.prefilter;

    let decision = match args.action {
        ActionArg::Ignore => None,
        ActionArg::KeepFirst => Some(Decision::Delete),
        ActionArg::MoveFirstTo => {
            let destination = args
                .destination
                .clone()
                .context("--action move-first-to needs --destination")?;
            Some(Decision::MoveAndDeleteRest(destination))
        }
    };

    let reporter: Arc<dyn ScanReporter> = if args.output == OutputFormat::Json {
        Arc::new(NullReporter)
    } else {
        Arc::new(Progress::new(quiet))
    };
    let finder = DuplicateFinder::new(config.finder_config().with_reporter(reporter));

    let (groups, summary) = finder
        .find_duplicates(&args.roots)
        .context("Duplicate scan failed")?;

    let exit_code = if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => TextOutput::new(&groups, &summary)
            .write_to(&mut out)
            .context("Failed to write report")?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, exit_code)
            .write_to(&mut out, true)
            .context("Failed to write report")?,
    }

    if let Some(decision) = decision {
        let executor = ActionExecutor::new(ActionConfig {
            permanent: args.permanent,
            dry_run: args.dry_run,
        });
        let report = apply_to_all(&executor, &groups, &decision)?;

        if args.output == OutputFormat::Text {
            writeln!(out, "{}", report.summary()).context("Failed to write report")?;
        } else {
            log::info!("{}", report.summary());
        }
        for (path, message) in &report.failures {
            log::error!("{}: {}", path.display(), message);
        }
    }

    Ok(exit_code)
}

fn apply_to_all(
    executor: &ActionExecutor,
    groups: &[DuplicateGroup],
    decision: &Decision,
) -> Result<ActionReport> {
    if let Decision::MoveAndDeleteRest(destination) = decision {
        ensure!(
            groups.len() < 2 || destination.is_dir(),
            "{} must be an existing directory when moving more than one group",
            destination.display()
        );
    }

    let mut total = ActionReport::default();
    for group in groups {
        let report = executor
            .apply(group, decision)
            .with_context(|| format!("Failed to apply {:?}", decision))?;
        total.merge(report);
    }
    total.dry_run = executor.config().dry_run;
    Ok(total)
}
