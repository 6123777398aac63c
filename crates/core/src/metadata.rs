//! Metadata replication from source entries onto snapshot entries
//!
//! Order matters: ownership and permission changes touch the inode, so the
//! timestamps are always stamped last.

use crate::error::{Result, SnapError};
use filetime::{set_file_times, set_symlink_file_times, FileTime};
use nix::unistd::{fchownat, geteuid, FchownatFlags, Gid, Uid};
use std::fs::{self, Metadata, Permissions};
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

/// Whether this process may change file ownership
///
/// Resolved once at startup; unprivileged runs skip chown silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Running as superuser: copy owner and group
    Preserve,
    /// Leave owner and group as created
    Skip,
}

impl Ownership {
    /// Detect the capability from the effective uid
    pub fn detect() -> Self {
        if geteuid().is_root() {
            Self::Preserve
        } else {
            Self::Skip
        }
    }

    pub fn can_change(self) -> bool {
        self == Self::Preserve
    }
}

/// Copy owner/group, permission bits and timestamps from `source` onto `dest`
pub fn replicate_metadata(dest: &Path, source: &Metadata, ownership: Ownership) -> Result<()> {
    set_owner_like(dest, source, ownership, FchownatFlags::FollowSymlink)?;
    set_permissions_like(dest, source)?;
    set_times_like(dest, source)
}

/// Stamp a directory that is about to be filled
///
/// Same as [`replicate_metadata`] except the owner keeps `rwx`, so a
/// read-only source directory can still be populated. The exact source
/// mode goes on with [`finish_directory`] once the contents are written.
pub fn replicate_open_directory(
    dest: &Path,
    source: &Metadata,
    ownership: Ownership,
) -> Result<()> {
    set_owner_like(dest, source, ownership, FchownatFlags::FollowSymlink)?;
    set_mode(dest, (source.mode() & 0o7777) | 0o700)?;
    set_times_like(dest, source)
}

/// Apply the exact source mode, then the source timestamps
///
/// Run after a directory's contents are complete: filling it bumped the
/// mtime and it may still carry the owner bits added on creation.
pub fn finish_directory(dest: &Path, source: &Metadata) -> Result<()> {
    set_permissions_like(dest, source)?;
    set_times_like(dest, source)
}

/// Copy owner/group and timestamps onto a symlink without following it
///
/// Symlink permission bits are not meaningful on Linux and are left alone.
pub fn replicate_symlink_metadata(
    dest: &Path,
    source: &Metadata,
    ownership: Ownership,
) -> Result<()> {
    set_owner_like(dest, source, ownership, FchownatFlags::NoFollowSymlink)?;

    let accessed = FileTime::from_last_access_time(source);
    let modified = FileTime::from_last_modification_time(source);
    set_symlink_file_times(dest, accessed, modified)
        .map_err(|e| SnapError::io("set symlink times on", dest, e))
}

fn set_owner_like(
    dest: &Path,
    source: &Metadata,
    ownership: Ownership,
    flags: FchownatFlags,
) -> Result<()> {
    if !ownership.can_change() {
        return Ok(());
    }

    let owner = Some(Uid::from_raw(source.uid()));
    let group = Some(Gid::from_raw(source.gid()));
    fchownat(None, dest, owner, group, flags)
        .map_err(|errno| SnapError::io("change ownership of", dest, errno.into()))
}

fn set_permissions_like(dest: &Path, source: &Metadata) -> Result<()> {
    set_mode(dest, source.mode() & 0o7777)
}

fn set_mode(dest: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(dest, Permissions::from_mode(mode))
        .map_err(|e| SnapError::io("set permissions on", dest, e))
}

fn set_times_like(dest: &Path, source: &Metadata) -> Result<()> {
    let accessed = FileTime::from_last_access_time(source);
    let modified = FileTime::from_last_modification_time(source);
    set_file_times(dest, accessed, modified).map_err(|e| SnapError::io("set times on", dest, e))
}
