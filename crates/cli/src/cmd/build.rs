//! Build today's snapshot

use crate::util;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use snap_core::{build_snapshot, resolve_anchor, AnchorPolicy, BuildReport, Ownership, RunContext};
use std::path::Path;
use tracing::info;

pub fn run(
    source: &Path,
    target: &Path,
    today: Option<&str>,
    anchor: Option<&str>,
    lookback_days: u32,
    json: bool,
) -> Result<()> {
    // 1. Preconditions; nothing is written until all of these pass
    let (source, target) = util::validate_roots(source, target)?;
    let today = util::resolve_today(today)?;
    let explicit_anchor = anchor
        .map(|value| util::parse_label(value, "--anchor"))
        .transpose()?;

    // 2. Pick the snapshot to compare against
    let anchor = resolve_anchor(&target, today, explicit_anchor, AnchorPolicy { lookback_days })
        .context("Failed to resolve anchor snapshot")?;

    // 3. Privilege is decided once for the whole run
    let ownership = Ownership::detect();
    if !ownership.can_change() {
        info!("Not running as root; file ownership will not be preserved");
    }

    let ctx = RunContext::new(source, target, today, anchor, ownership);

    // 4. Walk
    let report = build_snapshot(&ctx)
        .with_context(|| format!("Failed to build snapshot {}", today))?;

    // 5. Report
    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", out);
    } else {
        print_summary(&ctx, &report);
    }

    Ok(())
}

fn print_summary(ctx: &RunContext, report: &BuildReport) {
    println!(
        "{} {}",
        "Snapshot".bold(),
        ctx.today_root().display().to_string().cyan()
    );
    println!("Anchor:        {}", report.anchor.to_string().dimmed());
    println!();
    println!("Files copied:  {}", report.files_copied.to_string().yellow());
    println!("Files linked:  {}", report.files_linked.to_string().green());
    println!("Symlinks:      {}", report.symlinks_created);
    println!("Directories:   {}", report.dirs_created);
    println!();
    println!("Data written:  {}", util::format_size(report.bytes_copied).yellow());
    println!("Space saved:   {}", util::format_size(report.bytes_linked).green());

    if report.is_complete() {
        println!();
        println!("{}", "Snapshot complete".green().bold());
    } else {
        println!();
        println!(
            "{}",
            format!("{} entries skipped or incomplete:", report.warnings.len())
                .yellow()
                .bold()
        );
        for warning in &report.warnings {
            println!("  {} {}", warning.path.display(), warning.message.dimmed());
        }
    }
}
