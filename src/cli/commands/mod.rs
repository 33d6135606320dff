//! Command implementations

pub mod analyze;
pub mod common;
pub mod completions;
pub mod config;
pub mod sources;
pub mod tree;
