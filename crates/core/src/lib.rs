//! Snapshot engine for daysnap
//!
//! This crate provides:
//! - Dated snapshot labels (`YYYYMM/DD`)
//! - Anchor resolution (most recent prior snapshot within a lookback window)
//! - Directory materialization with source metadata
//! - The recursive walk that hardlinks unchanged files and copies the rest

pub mod anchor;
pub mod context;
pub mod entry;
pub mod error;
pub mod label;
pub mod materialize;
pub mod metadata;
pub mod report;
pub mod walker;

// Re-exports
pub use anchor::{resolve_anchor, AnchorPolicy, DEFAULT_LOOKBACK_DAYS};
pub use context::RunContext;
pub use entry::{ComparisonKey, EntryKind};
pub use error::{Result, SnapError};
pub use label::SnapshotLabel;
pub use metadata::Ownership;
pub use report::{BuildReport, EntryWarning, WarningKind};
pub use walker::{build_snapshot, TreeWalker};
