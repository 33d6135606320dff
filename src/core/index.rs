//! Relation index - parent→children lookup and component attributes

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::core::relation::RelationTable;

/// Descriptive attributes of a part, taken from a row where it is a component
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartAttributes {
    pub name: String,
    pub description: String,
    pub source_id: String,
}

/// Read-only lookup structure over one or more relation tables
///
/// `children` keeps source row order and skips empty component numbers.
/// `attributes` is resolved last-wins over the tables in the order given.
#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    children: HashMap<String, Vec<String>>,
    attributes: HashMap<String, PartAttributes>,
    products: HashSet<String>,
    sources: Vec<String>,
}

impl RelationIndex {
    /// Build an index from tables, in order
    pub fn build<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a RelationTable>,
    {
        let mut index = RelationIndex::default();

        for table in tables {
            index.sources.push(table.source_id().to_string());

            for row in table.rows() {
                if !row.product_no.is_empty() {
                    index.products.insert(row.product_no.clone());
                }

                let component = row.component_no.trim();
                if component.is_empty() {
                    continue;
                }

                index
                    .children
                    .entry(row.product_no.clone())
                    .or_default()
                    .push(component.to_string());

                index.attributes.insert(
                    component.to_string(),
                    PartAttributes {
                        name: row.name.clone(),
                        description: row.description.clone(),
                        source_id: row.source_id.clone(),
                    },
                );
            }
        }

        tracing::debug!(
            sources = ?index.sources,
            assemblies = index.children.len(),
            components = index.attributes.len(),
            "built relation index"
        );

        index
    }

    /// Direct children of a part, in source row order
    pub fn children(&self, part: &str) -> &[String] {
        self.children.get(part).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Attributes of a part that appears somewhere as a component
    pub fn attributes(&self, part: &str) -> Option<&PartAttributes> {
        self.attributes.get(part)
    }

    /// Whether the part appears as a product number in any row
    pub fn is_product(&self, part: &str) -> bool {
        self.products.contains(part)
    }

    /// Labels of the tables this index was built from
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Source label used when a node has no attributes of its own
    pub fn label(&self) -> String {
        self.sources.join(", ")
    }
}
