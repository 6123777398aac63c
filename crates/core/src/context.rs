//! Per-run context shared by the resolver, materializer and walker

use crate::label::SnapshotLabel;
use crate::metadata::Ownership;
use std::path::{Path, PathBuf};

/// Everything one snapshot run needs, fixed before the walk starts
///
/// Roots are expected to be validated by the caller (exist, are
/// directories, are distinct, have the right permissions).
#[derive(Debug, Clone)]
pub struct RunContext {
    source_root: PathBuf,
    target_root: PathBuf,
    today: SnapshotLabel,
    anchor: SnapshotLabel,
    ownership: Ownership,
}

impl RunContext {
    pub fn new(
        source_root: impl Into<PathBuf>,
        target_root: impl Into<PathBuf>,
        today: SnapshotLabel,
        anchor: SnapshotLabel,
        ownership: Ownership,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            target_root: target_root.into(),
            today,
            anchor,
            ownership,
        }
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn target_root(&self) -> &Path {
        &self.target_root
    }

    pub fn today(&self) -> SnapshotLabel {
        self.today
    }

    pub fn anchor(&self) -> SnapshotLabel {
        self.anchor
    }

    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Root of the snapshot being built this run
    pub fn today_root(&self) -> PathBuf {
        self.target_root.join(self.today.relative_path())
    }

    /// Root of the snapshot used for comparison and hardlinks
    pub fn anchor_root(&self) -> PathBuf {
        self.target_root.join(self.anchor.relative_path())
    }

    /// `source_root/<rel>`
    pub fn source_path(&self, rel: &Path) -> PathBuf {
        join_relative(&self.source_root, rel)
    }

    /// `target_root/<today>/<rel>`
    pub fn today_path(&self, rel: &Path) -> PathBuf {
        join_relative(&self.today_root(), rel)
    }

    /// `target_root/<anchor>/<rel>`
    pub fn anchor_path(&self, rel: &Path) -> PathBuf {
        join_relative(&self.anchor_root(), rel)
    }
}

// `Path::join("")` appends a trailing separator; keep roots clean.
fn join_relative(root: &Path, rel: &Path) -> PathBuf {
    if rel.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}
