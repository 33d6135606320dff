//! Report model - index rows plus one sheet per resolved part
//!
//! The model is renderer-agnostic: part numbers are carried exactly as
//! queried or loaded, and links are left to the renderers.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::core::classify::{AttributeRecord, PartResult, PartStatus};
use crate::core::expand::TreeNode;
use crate::core::index::RelationIndex;
use crate::core::relation::CombinedRelation;

/// One line of the report's index table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRow {
    pub part: String,
    pub display_name: String,
    pub status: PartStatus,
    pub sources: Vec<String>,
    pub searched_sources: Vec<String>,
}

/// Detail sheet for a part that was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartSheet {
    /// Merged multi-level structure of an assembly
    Tree {
        part: String,
        display_name: String,
        nodes: Vec<TreeNode>,
    },
    /// Attributes of a part that only appears as a component
    Component(AttributeRecord),
}

impl PartSheet {
    pub fn part(&self) -> &str {
        match self {
            PartSheet::Tree { part, .. } => part,
            PartSheet::Component(record) => &record.part,
        }
    }
}

/// Complete, renderer-independent analysis report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportModel {
    pub index_rows: Vec<IndexRow>,
    pub part_sheets: Vec<PartSheet>,
}

/// Outcome counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total: usize,
    pub bom_found: usize,
    pub component_only: usize,
    pub not_found: usize,
}

impl ReportModel {
    /// Assemble the report in query order
    ///
    /// `queried` is the deduplicated query list; blank entries are skipped
    /// and parts without a result are reported as not found. Display names
    /// come from the combined relation of all loaded sources, while the
    /// source columns reflect the searched `indices` only.
    pub fn build(
        queried: &[String],
        results: &HashMap<String, PartResult>,
        indices: &[RelationIndex],
        combined: &CombinedRelation,
    ) -> Self {
        let searched_sources: Vec<String> = indices
            .iter()
            .flat_map(|index| index.sources().iter().cloned())
            .collect();

        let mut model = ReportModel::default();

        for part in queried.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
            let display_name = combined.display_name(part).unwrap_or_default().to_string();
            let result = results.get(part).unwrap_or(&PartResult::NotFound);

            let sources = match result {
                PartResult::HasBom(nodes) => {
                    model.part_sheets.push(PartSheet::Tree {
                        part: part.to_string(),
                        display_name: display_name.clone(),
                        nodes: nodes.clone(),
                    });
                    bom_sources(part, indices)
                }
                PartResult::ComponentOnly(record) => {
                    model.part_sheets.push(PartSheet::Component(record.clone()));
                    vec![record.source.clone()]
                }
                PartResult::NotFound => Vec::new(),
            };

            model.index_rows.push(IndexRow {
                part: part.to_string(),
                display_name,
                status: result.status(),
                sources,
                searched_sources: searched_sources.clone(),
            });
        }

        model
    }

    /// Detail sheet for a part, if it has one
    pub fn sheet(&self, part: &str) -> Option<&PartSheet> {
        self.part_sheets.iter().find(|s| s.part() == part)
    }

    pub fn summary(&self) -> AnalysisSummary {
        let mut summary = AnalysisSummary {
            total: self.index_rows.len(),
            ..Default::default()
        };
        for row in &self.index_rows {
            match row.status {
                PartStatus::BomFound => summary.bom_found += 1,
                PartStatus::ComponentOnly => summary.component_only += 1,
                PartStatus::NotFound => summary.not_found += 1,
            }
        }
        summary
    }
}

/// Sorted labels of the searched sources that contribute children to the part
fn bom_sources(part: &str, indices: &[RelationIndex]) -> Vec<String> {
    indices
        .iter()
        .filter(|index| !index.children(part).is_empty())
        .flat_map(|index| index.sources().iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
