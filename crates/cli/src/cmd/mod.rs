//! CLI command implementations

pub mod anchor;
pub mod build;
