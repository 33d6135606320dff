//! bomtree: BOM Tree Generator
//!
//! Expands flat parent/child Bill of Materials tables, possibly spread over
//! several independently exported sources, into deduplicated multi-level
//! assembly reports.

pub mod cli;
pub mod core;
pub mod render;
