//! Outcome of a snapshot run

use crate::label::SnapshotLabel;
use serde::Serialize;
use std::path::PathBuf;

/// Why an entry is missing or incomplete in the snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Device node, socket, FIFO, ...
    Unsupported,
    /// Could not stat or list a source entry
    Unreadable,
    /// Could not create a directory in the snapshot
    Directory,
    /// Could not recreate a symlink
    Symlink,
    /// Could not hardlink against the anchor
    Hardlink,
    /// Could not copy a changed or new file
    Copy,
    /// Entry was created but its metadata could not be replicated
    Metadata,
    /// Destination already existed and was left alone
    Exists,
}

/// One recoverable problem encountered during the walk
#[derive(Debug, Clone, Serialize)]
pub struct EntryWarning {
    /// Path relative to the source root
    pub path: PathBuf,
    pub kind: WarningKind,
    pub message: String,
}

/// Counters and warnings for a finished run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub today: SnapshotLabel,
    pub anchor: SnapshotLabel,
    pub dirs_created: u64,
    pub files_copied: u64,
    pub files_linked: u64,
    pub symlinks_created: u64,
    pub bytes_copied: u64,
    /// Bytes that would have been copied without hardlinking
    pub bytes_linked: u64,
    pub warnings: Vec<EntryWarning>,
}

impl BuildReport {
    pub fn new(today: SnapshotLabel, anchor: SnapshotLabel) -> Self {
        Self {
            today,
            anchor,
            dirs_created: 0,
            files_copied: 0,
            files_linked: 0,
            symlinks_created: 0,
            bytes_copied: 0,
            bytes_linked: 0,
            warnings: Vec::new(),
        }
    }

    pub fn warn(
        &mut self,
        path: impl Into<PathBuf>,
        kind: WarningKind,
        message: impl Into<String>,
    ) {
        let path = path.into();
        let message = message.into();
        tracing::warn!("{}: {}", path.display(), message);
        self.warnings.push(EntryWarning {
            path,
            kind,
            message,
        });
    }

    /// True if every source entry made it into the snapshot
    pub fn is_complete(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn warnings_of(&self, kind: WarningKind) -> impl Iterator<Item = &EntryWarning> {
        self.warnings.iter().filter(move |w| w.kind == kind)
    }
}
