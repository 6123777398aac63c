//! daysnap CLI - dated hardlink snapshots

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

mod cmd;
mod util;

/// daysnap - Daily snapshots that hardlink whatever did not change
#[derive(Parser)]
#[command(name = "daysnap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build today's snapshot of SOURCE under TARGET/YYYYMM/DD
    Build {
        /// Directory to snapshot
        source: PathBuf,
        /// Directory holding the dated snapshots
        target: PathBuf,
        /// Label for this snapshot (default: today's local date)
        #[arg(long, value_name = "YYYYMM/DD")]
        today: Option<String>,
        /// Snapshot to hardlink against (default: most recent found)
        #[arg(long, value_name = "YYYYMM/DD")]
        anchor: Option<String>,
        /// Days to search back for the anchor snapshot
        #[arg(long, default_value_t = snap_core::DEFAULT_LOOKBACK_DAYS)]
        lookback_days: u32,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which snapshot the next build would hardlink against
    Anchor {
        /// Directory holding the dated snapshots
        target: PathBuf,
        /// Label of the snapshot about to be built (default: today)
        #[arg(long, value_name = "YYYYMM/DD")]
        today: Option<String>,
        /// Days to search back for the anchor snapshot
        #[arg(long, default_value_t = snap_core::DEFAULT_LOOKBACK_DAYS)]
        lookback_days: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Held until exit so buffered log lines reach the file
    let _guard = init_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    match cli.command {
        Commands::Build {
            source,
            target,
            today,
            anchor,
            lookback_days,
            json,
        } => cmd::build::run(
            &source,
            &target,
            today.as_deref(),
            anchor.as_deref(),
            lookback_days,
            json,
        ),
        Commands::Anchor {
            target,
            today,
            lookback_days,
        } => cmd::anchor::run(&target, today.as_deref(), lookback_days),
    }
}

fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file_name = path.file_name().context("Log file path has no file name")?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}
