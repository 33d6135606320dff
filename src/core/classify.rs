//! Part classification - merge per-source trees and decide each part's outcome

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::core::expand::{expand, TreeNode};
use crate::core::index::RelationIndex;

/// Attribute record shown for a part that only ever appears as a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    pub part: String,
    pub name: String,
    pub description: String,
    pub source: String,
}

/// Outcome of classifying one queried part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartResult {
    /// The part has its own structure in at least one searched source
    HasBom(Vec<TreeNode>),
    /// The part only appears as a child of other assemblies
    ComponentOnly(AttributeRecord),
    /// The part appears in no searched source
    NotFound,
}

impl PartResult {
    pub fn status(&self) -> PartStatus {
        match self {
            PartResult::HasBom(_) => PartStatus::BomFound,
            PartResult::ComponentOnly(_) => PartStatus::ComponentOnly,
            PartResult::NotFound => PartStatus::NotFound,
        }
    }

    /// Number of tree nodes (zero unless a BOM was found)
    pub fn node_count(&self) -> usize {
        match self {
            PartResult::HasBom(nodes) => nodes.len(),
            _ => 0,
        }
    }
}

/// Report-facing status label of a [`PartResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartStatus {
    #[serde(rename = "BOM Found")]
    BomFound,
    #[serde(rename = "Component Only")]
    ComponentOnly,
    #[serde(rename = "No BOM Found")]
    NotFound,
}

impl PartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartStatus::BomFound => "BOM Found",
            PartStatus::ComponentOnly => "Component Only",
            PartStatus::NotFound => "No BOM Found",
        }
    }
}

impl fmt::Display for PartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify one part against the searched sources
///
/// `indices` holds one index per selected source, in selection order. Trees
/// are concatenated in that order and a part already emitted by an earlier
/// source is dropped, whatever its depth or attributes. When no source
/// yields a tree, the first index that knows the part as a component
/// supplies its attributes.
pub fn classify(part: &str, indices: &[RelationIndex]) -> PartResult {
    let part = part.trim();

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for index in indices {
        for node in expand(index, part) {
            if seen.insert(node.part.clone()) {
                merged.push(node);
            }
        }
    }

    if !merged.is_empty() {
        return PartResult::HasBom(merged);
    }

    indices
        .iter()
        .find_map(|index| index.attributes(part))
        .map(|attrs| {
            PartResult::ComponentOnly(AttributeRecord {
                part: part.to_string(),
                name: attrs.name.clone(),
                description: attrs.description.clone(),
                source: attrs.source_id.clone(),
            })
        })
        .unwrap_or(PartResult::NotFound)
}

/// Progress notification emitted while a batch of parts is classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    PartStarted {
        position: usize,
        total: usize,
        part: String,
    },
    PartFinished {
        position: usize,
        total: usize,
        part: String,
        status: PartStatus,
        node_count: usize,
    },
}

/// Receives [`ProgressEvent`]s from the classifier
///
/// With parallel classification events may arrive out of query order.
pub trait ProgressObserver: Sync {
    fn on_event(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Sync,
{
    fn on_event(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Observer that ignores every event
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_event(&self, _event: &ProgressEvent) {}
}

fn classify_observed(
    position: usize,
    total: usize,
    part: &str,
    indices: &[RelationIndex],
    observer: &dyn ProgressObserver,
) -> PartResult {
    observer.on_event(&ProgressEvent::PartStarted {
        position,
        total,
        part: part.to_string(),
    });

    let result = classify(part, indices);
    tracing::debug!(part, status = %result.status(), nodes = result.node_count(), "classified part");

    observer.on_event(&ProgressEvent::PartFinished {
        position,
        total,
        part: part.to_string(),
        status: result.status(),
        node_count: result.node_count(),
    });
    result
}

fn trimmed_parts(parts: &[String]) -> Vec<&str> {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Classify every part in query order
///
/// Blank parts are skipped. The returned pairs keep the query order.
pub fn analyze_parts(
    parts: &[String],
    indices: &[RelationIndex],
    observer: &dyn ProgressObserver,
) -> Vec<(String, PartResult)> {
    let parts = trimmed_parts(parts);
    let total = parts.len();

    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            let result = classify_observed(i + 1, total, part, indices, observer);
            (part.to_string(), result)
        })
        .collect()
}

/// Classify every part on the rayon thread pool
///
/// Produces the same output as [`analyze_parts`]; results are collected
/// back into query order.
pub fn analyze_parts_parallel(
    parts: &[String],
    indices: &[RelationIndex],
    observer: &dyn ProgressObserver,
) -> Vec<(String, PartResult)> {
    let parts = trimmed_parts(parts);
    let total = parts.len();

    parts
        .par_iter()
        .enumerate()
        .map(|(i, part)| {
            let result = classify_observed(i + 1, total, part, indices, observer);
            (part.to_string(), result)
        })
        .collect()
}
