//! Directory materialization under today's snapshot

use crate::context::RunContext;
use crate::error::{Result, SnapError};
use crate::metadata::replicate_open_directory;
use std::fs::{self, DirBuilder, Permissions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Mode for the bare dated directories seeded before the walk
pub const SNAPSHOT_ROOT_MODE: u32 = 0o700;

/// Seed `target/YYYYMM/DD` with a fixed restrictive mode
///
/// Either segment may already exist (the month directory is shared by every
/// day in it); existing segments are left alone. Returns true if the day
/// directory was created by this call.
pub fn create_snapshot_root(ctx: &RunContext) -> Result<bool> {
    let today = ctx.today();
    let month_dir = ctx.target_root().join(today.month_segment());
    let day_dir = month_dir.join(today.day_segment());

    create_restricted_dir(&month_dir)?;
    create_restricted_dir(&day_dir)
}

fn create_restricted_dir(dir: &Path) -> Result<bool> {
    if exists_no_follow(dir)? {
        return Ok(false);
    }

    DirBuilder::new()
        .mode(SNAPSHOT_ROOT_MODE)
        .create(dir)
        .map_err(|e| SnapError::io("create directory", dir, e))?;
    // The umask may have narrowed the mode further; pin it exactly.
    fs::set_permissions(dir, Permissions::from_mode(SNAPSHOT_ROOT_MODE))
        .map_err(|e| SnapError::io("set permissions on", dir, e))?;

    debug!("Created snapshot root {}", dir.display());
    Ok(true)
}

/// Ensure every segment of `rel` exists under today's snapshot
///
/// Missing segments are created and stamped from the matching source
/// directory (owner when privileged, mode, times). The owner keeps `rwx` on
/// new segments until the caller applies the exact mode with
/// [`finish_directory`](crate::metadata::finish_directory). Existing
/// segments are not touched. Returns the relative paths that were created,
/// outermost first.
pub fn materialize_dir(ctx: &RunContext, rel: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();
    let mut prefix = PathBuf::new();

    for component in rel.components() {
        prefix.push(component);

        let dest = ctx.today_path(&prefix);
        if exists_no_follow(&dest)? {
            continue;
        }

        let source = ctx.source_path(&prefix);
        let source_meta = fs::symlink_metadata(&source)
            .map_err(|e| SnapError::io("stat source directory", &source, e))?;

        fs::create_dir(&dest).map_err(|e| SnapError::io("create directory", &dest, e))?;
        replicate_open_directory(&dest, &source_meta, ctx.ownership())?;

        debug!("Materialized {}", dest.display());
        created.push(prefix.clone());
    }

    Ok(created)
}

fn exists_no_follow(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SnapError::io("inspect", path, e)),
    }
}
