//! Retention anchor resolution
//!
//! Picks the snapshot a new run compares against and hardlinks from: the
//! most recent dated directory within the lookback window, or yesterday as
//! a backstop so every lookup has a defined anchor path.

use crate::error::Result;
use crate::label::SnapshotLabel;
use std::path::Path;
use tracing::{debug, info};

/// Default number of days searched backwards from today
pub const DEFAULT_LOOKBACK_DAYS: u32 = 60;

/// Anchor search settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorPolicy {
    /// How many days before today to probe
    pub lookback_days: u32,
}

impl Default for AnchorPolicy {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

/// Resolve the anchor label for a run on `today`
///
/// An explicit anchor wins unconditionally; its format was already checked
/// when it was parsed into a [`SnapshotLabel`].
pub fn resolve_anchor(
    target_root: &Path,
    today: SnapshotLabel,
    explicit: Option<SnapshotLabel>,
    policy: AnchorPolicy,
) -> Result<SnapshotLabel> {
    if let Some(anchor) = explicit {
        info!("Using explicit anchor {}", anchor);
        return Ok(anchor);
    }

    if let Some(found) = find_recent_snapshot(target_root, today, policy.lookback_days)? {
        info!("Anchoring against snapshot {}", found);
        return Ok(found);
    }

    let fallback = today.previous()?;
    info!(
        "No snapshot within {} days, defaulting anchor to {}",
        policy.lookback_days, fallback
    );
    Ok(fallback)
}

/// Most recent existing snapshot strictly before `today`, at most
/// `lookback_days` back
pub fn find_recent_snapshot(
    target_root: &Path,
    today: SnapshotLabel,
    lookback_days: u32,
) -> Result<Option<SnapshotLabel>> {
    for days_back in 1..=u64::from(lookback_days) {
        let candidate = today.days_before(days_back)?;
        let candidate_dir = target_root.join(candidate.relative_path());
        debug!("Probing {}", candidate_dir.display());

        if candidate_dir.is_dir() {
            return Ok(Some(candidate));
        }
    }

    Ok(None)
}
