//! Normalized BOM relation tables
//!
//! Every loaded source is reduced to a [`RelationTable`]: an ordered list of
//! parent→child [`EdgeRecord`]s tagged with the source label. Column layout
//! differences between sources are resolved once, at load time, through a
//! [`ColumnMapping`]; nothing downstream reads columns by position.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// One parent→child row of a BOM source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Parent (assembly) part number
    pub product_no: String,

    /// Descriptive name of the parent, when the source carries one
    pub product_name: String,

    /// Child part number (may be empty in malformed sources)
    pub component_no: String,

    /// Component name
    pub name: String,

    /// Component description
    pub description: String,

    /// Label of the source this row came from
    pub source_id: String,
}

/// All edges read from a single source, in source row order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationTable {
    source_id: String,
    rows: Vec<EdgeRecord>,
}

impl RelationTable {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            rows: Vec::new(),
        }
    }

    /// Append an edge; fields are trimmed and tagged with this table's source
    pub fn push_edge(
        &mut self,
        product_no: &str,
        product_name: &str,
        component_no: &str,
        name: &str,
        description: &str,
    ) {
        self.rows.push(EdgeRecord {
            product_no: product_no.trim().to_string(),
            product_name: product_name.trim().to_string(),
            component_no: component_no.trim().to_string(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            source_id: self.source_id.clone(),
        });
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn rows(&self) -> &[EdgeRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct parent part numbers
    pub fn assembly_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.product_no.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of distinct non-empty child part numbers
    pub fn component_count(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.component_no.as_str())
            .filter(|c| !c.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Reference to a source column, either by header name or by 1-based position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Position(usize),
    Name(String),
}

impl ColumnRef {
    /// Find the zero-based column index within the given headers
    ///
    /// Header names match case-insensitively after trimming. Positions past
    /// the end of the header row resolve to `None`.
    pub fn resolve(&self, headers: &[String]) -> Option<usize> {
        match self {
            ColumnRef::Position(0) => None,
            ColumnRef::Position(pos) => (*pos <= headers.len()).then(|| pos - 1),
            ColumnRef::Name(name) => {
                let wanted = name.trim().to_lowercase();
                headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Position(pos) => write!(f, "column #{}", pos),
            ColumnRef::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Maps a source's column layout onto the fixed [`EdgeRecord`] shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub product_no: ColumnRef,
    pub component_no: ColumnRef,
    pub product_name: ColumnRef,
    pub name: ColumnRef,
    pub description: ColumnRef,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            product_no: ColumnRef::Name("Product no".to_string()),
            component_no: ColumnRef::Name("Component no".to_string()),
            product_name: ColumnRef::Position(3),
            name: ColumnRef::Position(7),
            description: ColumnRef::Position(8),
        }
    }
}

/// Column indices resolved against one source's header row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub product_no: usize,
    pub component_no: usize,
    pub product_name: Option<usize>,
    pub name: Option<usize>,
    pub description: Option<usize>,
}

impl ColumnMapping {
    /// Resolve the mapping against a header row
    ///
    /// Returns the names of the required columns that could not be found.
    /// Optional descriptive columns that are absent resolve to `None` and
    /// read as empty strings.
    pub fn resolve(&self, headers: &[String]) -> Result<ResolvedColumns, Vec<String>> {
        let product_no = self.product_no.resolve(headers);
        let component_no = self.component_no.resolve(headers);

        match (product_no, component_no) {
            (Some(product_no), Some(component_no)) => Ok(ResolvedColumns {
                product_no,
                component_no,
                product_name: self.product_name.resolve(headers),
                name: self.name.resolve(headers),
                description: self.description.resolve(headers),
            }),
            _ => {
                let mut missing = Vec::new();
                if product_no.is_none() {
                    missing.push(self.product_no.to_string());
                }
                if component_no.is_none() {
                    missing.push(self.component_no.to_string());
                }
                Err(missing)
            }
        }
    }
}

/// Union of every loaded table with duplicate relationships collapsed
///
/// A `(product_no, component_no)` pair is kept at its first occurrence in
/// load order; later duplicates are dropped.
#[derive(Debug, Clone, Default)]
pub struct CombinedRelation {
    edges: Vec<EdgeRecord>,
    display_names: HashMap<String, String>,
    source_count: usize,
}

impl CombinedRelation {
    pub fn build<'a, I>(tables: I) -> Self
    where
        I: IntoIterator<Item = &'a RelationTable>,
    {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut edges = Vec::new();
        let mut display_names = HashMap::new();
        let mut source_count = 0;

        for table in tables {
            source_count += 1;
            for row in table.rows() {
                if !seen.insert((row.product_no.as_str(), row.component_no.as_str())) {
                    continue;
                }
                display_names
                    .entry(row.product_no.clone())
                    .or_insert_with(|| row.product_name.clone());
                edges.push(row.clone());
            }
        }

        Self {
            edges,
            display_names,
            source_count,
        }
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    /// Number of unique relationships
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }

    /// Name of a part taken from its first row as a parent, if any
    pub fn display_name(&self, part: &str) -> Option<&str> {
        self.display_names.get(part).map(String::as_str)
    }
}
