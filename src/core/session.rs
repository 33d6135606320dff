//! Analysis session - loaded sources, source selection and run-level errors

use miette::Diagnostic;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::classify::{analyze_parts, analyze_parts_parallel, PartResult, ProgressObserver};
use crate::core::index::RelationIndex;
use crate::core::loader::{load_sources, LoadError, LoadOptions};
use crate::core::relation::{CombinedRelation, RelationTable};
use crate::core::report::ReportModel;

/// Fatal, run-level failures
#[derive(Debug, Error, Diagnostic)]
pub enum AnalysisError {
    #[error("no usable BOM sources were loaded")]
    #[diagnostic(
        code(bomtree::analysis::no_sources),
        help("pass at least one readable .csv, .tsv or .txt file with --bom, --dir or --preset")
    )]
    NoUsableSources,

    #[error("missing required column(s): {}", .columns.join(", "))]
    #[diagnostic(
        code(bomtree::analysis::missing_columns),
        help("map the source columns in the `columns` section of .bomtree.yaml")
    )]
    MissingColumns { columns: Vec<String> },

    #[error("unknown source '{label}'")]
    #[diagnostic(code(bomtree::analysis::unknown_source), help("loaded sources: {available}"))]
    UnknownSource { label: String, available: String },

    #[error("no part numbers to analyze")]
    #[diagnostic(
        code(bomtree::analysis::no_parts),
        help("give part numbers as arguments or with --parts-file")
    )]
    NoParts,
}

/// Everything loaded for one run
#[derive(Debug)]
pub struct Session {
    tables: Vec<RelationTable>,
    combined: CombinedRelation,
    load_errors: Vec<LoadError>,
}

impl Session {
    /// Load every path, keeping the files that succeed
    ///
    /// Per-file failures are kept in [`Session::load_errors`]. The load
    /// only fails when no file could be used at all.
    pub fn load(paths: &[PathBuf], options: &LoadOptions) -> Result<Self, AnalysisError> {
        let outcome = load_sources(paths, options);
        Self::from_tables(outcome.tables, outcome.errors)
    }

    /// Build a session from already-loaded tables
    pub fn from_tables(tables: Vec<RelationTable>, load_errors: Vec<LoadError>) -> Result<Self, AnalysisError> {
        if tables.is_empty() {
            let mut columns: Vec<String> = Vec::new();
            for err in &load_errors {
                if let LoadError::MissingColumns { columns: missing, .. } = err {
                    for col in missing {
                        if !columns.contains(col) {
                            columns.push(col.clone());
                        }
                    }
                }
            }
            return Err(if columns.is_empty() {
                AnalysisError::NoUsableSources
            } else {
                AnalysisError::MissingColumns { columns }
            });
        }

        let combined = CombinedRelation::build(&tables);
        tracing::info!(
            sources = tables.len(),
            relationships = combined.len(),
            "combined BOM sources"
        );

        Ok(Self {
            tables,
            combined,
            load_errors,
        })
    }

    pub fn tables(&self) -> &[RelationTable] {
        &self.tables
    }

    pub fn combined(&self) -> &CombinedRelation {
        &self.combined
    }

    pub fn load_errors(&self) -> &[LoadError] {
        &self.load_errors
    }

    pub fn labels(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.source_id().to_string()).collect()
    }

    /// Resolve source labels to tables, in the order given
    ///
    /// An empty selection means every loaded source in load order.
    pub fn select(&self, labels: &[String]) -> Result<Vec<&RelationTable>, AnalysisError> {
        if labels.is_empty() {
            return Ok(self.tables.iter().collect());
        }

        let mut selected: Vec<&RelationTable> = Vec::new();
        for label in labels {
            let table = self
                .tables
                .iter()
                .find(|t| t.source_id() == label.as_str())
                .ok_or_else(|| AnalysisError::UnknownSource {
                    label: label.clone(),
                    available: self.labels().join(", "),
                })?;
            if !selected.iter().any(|t| t.source_id() == label.as_str()) {
                selected.push(table);
            }
        }
        Ok(selected)
    }

    /// One index per selected source, in selection order
    pub fn indices(&self, labels: &[String]) -> Result<Vec<RelationIndex>, AnalysisError> {
        Ok(self
            .select(labels)?
            .into_iter()
            .map(|table| RelationIndex::build([table]))
            .collect())
    }

    /// Classify the parts against the selected sources and build the report
    pub fn analyze(
        &self,
        parts: &[String],
        labels: &[String],
        parallel: bool,
        observer: &dyn ProgressObserver,
    ) -> Result<ReportModel, AnalysisError> {
        if parts.iter().all(|p| p.trim().is_empty()) {
            return Err(AnalysisError::NoParts);
        }

        let indices = self.indices(labels)?;
        let classified = if parallel {
            analyze_parts_parallel(parts, &indices, observer)
        } else {
            analyze_parts(parts, &indices, observer)
        };
        let results: HashMap<String, PartResult> = classified.into_iter().collect();

        Ok(ReportModel::build(parts, &results, &indices, &self.combined))
    }
}
