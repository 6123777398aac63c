//! Workflow integration tests
//!
//! Multi-run scenarios that exercise the binary end to end.

pub mod edge_cases;
pub mod snapshot_lifecycle;
