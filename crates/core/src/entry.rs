//! Source entry classification and change detection

use filetime::FileTime;
use std::fs::{FileType, Metadata};
use std::os::unix::fs::FileTypeExt;

/// Kind of source entry, as seen without following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory (recursed into)
    Directory,
    /// Regular file (hardlinked or copied)
    RegularFile,
    /// Symbolic link (recreated, never followed)
    Symlink,
    /// Anything else: devices, sockets, FIFOs
    Unsupported,
}

impl EntryKind {
    /// Classify a file type; symlinks win over whatever they point at
    pub fn of(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::RegularFile
        } else {
            Self::Unsupported
        }
    }
}

/// Human name for a file type, used in warnings
pub fn describe(file_type: FileType) -> &'static str {
    if file_type.is_fifo() {
        "named pipe"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() {
        "block device"
    } else if file_type.is_char_device() {
        "character device"
    } else if file_type.is_symlink() {
        "symlink"
    } else if file_type.is_dir() {
        "directory"
    } else if file_type.is_file() {
        "regular file"
    } else {
        "unknown file type"
    }
}

/// `(mtime, size)` pair deciding whether a file is unchanged
///
/// Equal keys are treated as equal content. No bytes are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonKey {
    pub mtime: FileTime,
    pub size: u64,
}

impl ComparisonKey {
    pub fn from_metadata(meta: &Metadata) -> Self {
        Self {
            mtime: FileTime::from_last_modification_time(meta),
            size: meta.len(),
        }
    }
}
