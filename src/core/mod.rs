//! Core module - BOM relations, tree expansion and report assembly

pub mod classify;
pub mod config;
pub mod expand;
pub mod index;
pub mod loader;
pub mod parts;
pub mod relation;
pub mod report;
pub mod session;

pub use classify::{
    analyze_parts, analyze_parts_parallel, classify, AttributeRecord, NoProgress, PartResult,
    PartStatus, ProgressEvent, ProgressObserver,
};
pub use config::{Config, ConfigError, PresetSource};
pub use expand::{expand, TreeNode};
pub use index::{PartAttributes, RelationIndex};
pub use loader::{LoadError, LoadOptions, LoadOutcome};
pub use relation::{ColumnMapping, ColumnRef, CombinedRelation, EdgeRecord, RelationTable};
pub use report::{AnalysisSummary, IndexRow, PartSheet, ReportModel};
pub use session::{AnalysisError, Session};
