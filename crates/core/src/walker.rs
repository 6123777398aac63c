//! Recursive snapshot walk
//!
//! Mirrors `source/<rel>` into `target/<today>/<rel>`, hardlinking files
//! whose [`ComparisonKey`] matches `target/<anchor>/<rel>` and copying the
//! rest. Per-entry failures become warnings in the [`BuildReport`]; only a
//! failure on the source root itself aborts the run.

use crate::context::RunContext;
use crate::entry::{describe, ComparisonKey, EntryKind};
use crate::error::{Result, SnapError};
use crate::materialize::{create_snapshot_root, materialize_dir};
use crate::metadata::{finish_directory, replicate_metadata, replicate_symlink_metadata};
use crate::report::{BuildReport, WarningKind};
use std::fs::{self, Metadata};
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Build today's snapshot for `ctx`
///
/// Seeds the dated root directory, then walks the whole source tree.
pub fn build_snapshot(ctx: &RunContext) -> Result<BuildReport> {
    info!(
        "Building snapshot {} of {} (anchor {})",
        ctx.today(),
        ctx.source_root().display(),
        ctx.anchor()
    );

    create_snapshot_root(ctx)?;
    let report = TreeWalker::new(ctx).run()?;

    info!(
        "Snapshot {} done: {} copied, {} linked, {} symlinks, {} warnings",
        report.today,
        report.files_copied,
        report.files_linked,
        report.symlinks_created,
        report.warnings.len()
    );
    Ok(report)
}

/// Depth-first walker for a single run
pub struct TreeWalker<'a> {
    ctx: &'a RunContext,
    report: BuildReport,
}

impl<'a> TreeWalker<'a> {
    pub fn new(ctx: &'a RunContext) -> Self {
        Self {
            ctx,
            report: BuildReport::new(ctx.today(), ctx.anchor()),
        }
    }

    /// Walk from the source root; expects today's root to exist already
    pub fn run(mut self) -> Result<BuildReport> {
        self.walk_contents(Path::new(""))?;
        Ok(self.report)
    }

    /// Materialize a subdirectory, walk it, then restore its mode and mtime
    fn descend(&mut self, rel: &Path, source_meta: &Metadata) {
        let created = match materialize_dir(self.ctx, rel) {
            Ok(created) => created,
            Err(e) => {
                self.report
                    .warn(rel, WarningKind::Directory, format!("subtree skipped: {}", e));
                return;
            }
        };
        self.report.dirs_created += created.len() as u64;

        if let Err(e) = self.walk_contents(rel) {
            self.report
                .warn(rel, WarningKind::Unreadable, format!("subtree incomplete: {}", e));
        }

        // Only directories made by this run; innermost first so a
        // read-only parent is locked after its children.
        for dir in created.iter().rev() {
            let meta = if dir == rel {
                Ok(source_meta.clone())
            } else {
                let source = self.ctx.source_path(dir);
                fs::symlink_metadata(&source).map_err(|e| SnapError::io("stat", &source, e))
            };
            let result = meta.and_then(|meta| finish_directory(&self.ctx.today_path(dir), &meta));
            if let Err(e) = result {
                self.report.warn(dir.as_path(), WarningKind::Metadata, e.to_string());
            }
        }
    }

    /// Handle every entry of one directory; subdirectories go last
    fn walk_contents(&mut self, rel: &Path) -> Result<()> {
        let source_dir = self.ctx.source_path(rel);
        let entries =
            fs::read_dir(&source_dir).map_err(|e| SnapError::io("list", &source_dir, e))?;

        let mut subdirs: Vec<(PathBuf, Metadata)> = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.report.warn(
                        rel,
                        WarningKind::Unreadable,
                        format!("failed to read directory entry: {}", e),
                    );
                    continue;
                }
            };

            let entry_rel = rel.join(entry.file_name());
            let meta = match fs::symlink_metadata(entry.path()) {
                Ok(meta) => meta,
                Err(e) => {
                    self.report
                        .warn(entry_rel, WarningKind::Unreadable, format!("stat failed: {}", e));
                    continue;
                }
            };

            match EntryKind::of(meta.file_type()) {
                EntryKind::Directory => subdirs.push((entry_rel, meta)),
                EntryKind::Symlink => self.replicate_symlink(&entry_rel, &meta),
                EntryKind::RegularFile => self.replicate_file(&entry_rel, &meta),
                EntryKind::Unsupported => {
                    let what = describe(meta.file_type());
                    self.report.warn(
                        entry_rel,
                        WarningKind::Unsupported,
                        format!("unsupported entry ({}), skipped", what),
                    );
                }
            }
        }

        for (sub_rel, sub_meta) in subdirs {
            self.descend(&sub_rel, &sub_meta);
        }

        Ok(())
    }

    fn replicate_symlink(&mut self, rel: &Path, meta: &Metadata) {
        let source = self.ctx.source_path(rel);
        let dest = self.ctx.today_path(rel);

        let link_target = match fs::read_link(&source) {
            Ok(t) => t,
            Err(e) => {
                self.report
                    .warn(rel, WarningKind::Unreadable, format!("readlink failed: {}", e));
                return;
            }
        };

        if let Err(e) = symlink(&link_target, &dest) {
            self.report.warn(
                rel,
                WarningKind::Symlink,
                format!("failed to create symlink to {}: {}", link_target.display(), e),
            );
            return;
        }
        self.report.symlinks_created += 1;
        debug!("Symlinked {} -> {}", rel.display(), link_target.display());

        if let Err(e) = replicate_symlink_metadata(&dest, meta, self.ctx.ownership()) {
            self.report.warn(rel, WarningKind::Metadata, e.to_string());
        }
    }

    fn replicate_file(&mut self, rel: &Path, meta: &Metadata) {
        let dest = self.ctx.today_path(rel);

        // Never write through an existing entry: it may share an inode
        // with the anchor snapshot.
        match fs::symlink_metadata(&dest) {
            Ok(_) => {
                self.report.warn(
                    rel,
                    WarningKind::Exists,
                    "destination already exists, left untouched",
                );
                return;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                self.report.warn(
                    rel,
                    WarningKind::Unreadable,
                    format!("cannot inspect destination: {}", e),
                );
                return;
            }
        }

        let key = ComparisonKey::from_metadata(meta);
        let anchor = self.ctx.anchor_path(rel);

        if anchor_matches(&anchor, key) {
            match fs::hard_link(&anchor, &dest) {
                Ok(()) => {
                    self.report.files_linked += 1;
                    self.report.bytes_linked += key.size;
                    debug!("Linked {}", rel.display());
                }
                Err(e) => {
                    self.report.warn(
                        rel,
                        WarningKind::Hardlink,
                        format!("failed to link from {}: {}", anchor.display(), e),
                    );
                }
            }
            return;
        }

        let source = self.ctx.source_path(rel);
        match fs::copy(&source, &dest) {
            Ok(bytes) => {
                self.report.files_copied += 1;
                self.report.bytes_copied += bytes;
                debug!("Copied {} ({} bytes)", rel.display(), bytes);
            }
            Err(e) => {
                self.report
                    .warn(rel, WarningKind::Copy, format!("copy failed: {}", e));
                return;
            }
        }

        if let Err(e) = replicate_metadata(&dest, meta, self.ctx.ownership()) {
            self.report.warn(rel, WarningKind::Metadata, e.to_string());
        }
    }
}

/// True if `anchor` is a regular file with the same key
fn anchor_matches(anchor: &Path, key: ComparisonKey) -> bool {
    match fs::symlink_metadata(anchor) {
        Ok(anchor_meta) => {
            anchor_meta.file_type().is_file() && ComparisonKey::from_metadata(&anchor_meta) == key
        }
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                debug!("Anchor {} unusable: {}", anchor.display(), e);
            }
            false
        }
    }
}
