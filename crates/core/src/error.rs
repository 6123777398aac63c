//! Error types for snapshot building

use std::io;
use std::path::{Path, PathBuf};

/// Fatal errors raised by the snapshot engine
///
/// Per-entry problems during the walk are not errors; they are collected as
/// [`crate::report::EntryWarning`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    /// A date label did not match `YYYYMM/DD`
    #[error("invalid snapshot label '{label}': {reason}")]
    InvalidLabel { label: String, reason: &'static str },

    /// Date arithmetic left the supported calendar range
    #[error("date out of range while resolving snapshot labels")]
    DateOutOfRange,

    /// Filesystem operation failed
    #[error("failed to {op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SnapError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid_label(label: &str, reason: &'static str) -> Self {
        Self::InvalidLabel {
            label: label.to_string(),
            reason,
        }
    }
}

/// Result type for snapshot operations
pub type Result<T> = std::result::Result<T, SnapError>;
