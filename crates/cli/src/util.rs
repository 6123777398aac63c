//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use nix::unistd::{access, AccessFlags};
use snap_core::SnapshotLabel;
use std::path::{Path, PathBuf};

/// Parse a `YYYYMM/DD` label given on the command line
pub fn parse_label(value: &str, flag: &str) -> Result<SnapshotLabel> {
    SnapshotLabel::parse(value).with_context(|| format!("Invalid {} label", flag))
}

/// Label for the snapshot being built: `--today` or the local calendar date
pub fn resolve_today(override_label: Option<&str>) -> Result<SnapshotLabel> {
    match override_label {
        Some(value) => parse_label(value, "--today"),
        None => Ok(SnapshotLabel::from_date(chrono::Local::now().date_naive())),
    }
}

/// Check the source root: existing, a directory, readable and searchable
pub fn validate_source(source: &Path) -> Result<PathBuf> {
    let source = canonical_dir(source, "Source")?;
    access(source.as_path(), AccessFlags::R_OK | AccessFlags::X_OK)
        .with_context(|| format!("Source directory is not readable: {}", source.display()))?;
    Ok(source)
}

/// Check the target root: existing, a directory, writable and searchable
pub fn validate_target(target: &Path) -> Result<PathBuf> {
    let target = canonical_dir(target, "Target")?;
    access(target.as_path(), AccessFlags::W_OK | AccessFlags::X_OK)
        .with_context(|| format!("Target directory is not writable: {}", target.display()))?;
    Ok(target)
}

/// Check a target root that is only read: existing, readable and searchable
pub fn validate_readable_target(target: &Path) -> Result<PathBuf> {
    let target = canonical_dir(target, "Target")?;
    access(target.as_path(), AccessFlags::R_OK | AccessFlags::X_OK)
        .with_context(|| format!("Target directory is not readable: {}", target.display()))?;
    Ok(target)
}

/// Validate both roots and make sure they do not overlap
pub fn validate_roots(source: &Path, target: &Path) -> Result<(PathBuf, PathBuf)> {
    let source = validate_source(source)?;
    let target = validate_target(target)?;

    if source == target {
        anyhow::bail!("Target is the same directory as source: {}", source.display());
    }
    if target.starts_with(&source) {
        anyhow::bail!(
            "Target {} lies inside source {}; snapshots would include themselves",
            target.display(),
            source.display()
        );
    }

    Ok((source, target))
}

fn canonical_dir(path: &Path, what: &str) -> Result<PathBuf> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("{} directory does not exist: {}", what, path.display()))?;
    if !canonical.is_dir() {
        anyhow::bail!("{} is not a directory: {}", what, path.display());
    }
    Ok(canonical)
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
