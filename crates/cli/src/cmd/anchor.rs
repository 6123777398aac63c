//! Show the anchor snapshot the next build would use

use crate::util;
use anyhow::{Context, Result};
use snap_core::anchor::find_recent_snapshot;
use std::path::Path;

pub fn run(target: &Path, today: Option<&str>, lookback_days: u32) -> Result<()> {
    let target = util::validate_readable_target(target)?;
    let today = util::resolve_today(today)?;

    let found = find_recent_snapshot(&target, today, lookback_days)
        .context("Failed to search for snapshots")?;

    match found {
        Some(anchor) => println!("{}", anchor),
        None => println!(
            "{} (no snapshot within {} days)",
            today.previous()?,
            lookback_days
        ),
    }

    Ok(())
}
