//! Query part lists
//!
//! Parts can be typed on the command line or read from a column of a
//! delimited file or workbook. The combined list keeps first-occurrence
//! order.

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::loader::{decode_text, is_workbook, read_workbook_rows, sniff_delimiter};

#[derive(Debug, Error)]
pub enum PartListError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {source}", .path.display())]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("part column must be 1 or greater")]
    InvalidColumn,
}

/// How to read a part list file
#[derive(Debug, Clone)]
pub struct PartFileOptions {
    /// 1-based column holding part numbers
    pub column: usize,
    /// Field delimiter; sniffed from the first line when `None`
    pub delimiter: Option<u8>,
    /// Treat the first row as a header
    pub has_header: bool,
}

impl Default for PartFileOptions {
    fn default() -> Self {
        Self {
            column: 3,
            delimiter: None,
            has_header: false,
        }
    }
}

/// Spreadsheet exports write `nan` into cells that were empty
fn is_empty_cell(value: &str) -> bool {
    value.is_empty() || value == "nan"
}

/// Read part numbers from one column of delimited text
///
/// Rows too short for the column, blank cells and `nan` placeholders are
/// ignored.
pub fn parse_part_list(data: &str, options: &PartFileOptions) -> Result<Vec<String>, csv::Error> {
    let data = data.trim_start_matches('\u{feff}');
    let delimiter = options.delimiter.unwrap_or_else(|| {
        data.lines()
            .find(|l| !l.trim().is_empty())
            .map(sniff_delimiter)
            .unwrap_or(b',')
    });

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(options.has_header)
        .from_reader(data.as_bytes());

    let idx = options.column.saturating_sub(1);
    let mut parts = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        if let Some(value) = record.get(idx).map(str::trim) {
            if !is_empty_cell(value) {
                parts.push(value.to_string());
            }
        }
    }
    Ok(parts)
}

/// Read a part list file
pub fn read_part_file(path: &Path, options: &PartFileOptions) -> Result<Vec<String>, PartListError> {
    if options.column == 0 {
        return Err(PartListError::InvalidColumn);
    }
    if is_workbook(path) {
        return read_part_workbook(path, options);
    }
    let bytes = fs::read(path).map_err(|source| PartListError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = decode_text(&bytes);
    parse_part_list(&data, options).map_err(|source| PartListError::Csv {
        path: path.to_path_buf(),
        source,
    })
}

fn read_part_workbook(path: &Path, options: &PartFileOptions) -> Result<Vec<String>, PartListError> {
    let rows = read_workbook_rows(path).map_err(|source| PartListError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let idx = options.column - 1;
    let skip = usize::from(options.has_header);

    Ok(rows
        .into_iter()
        .skip(skip)
        .filter_map(|row| row.get(idx).map(|cell| cell.trim().to_string()))
        .filter(|cell| !cell.is_empty())
        .collect())
}

/// Trim, drop empty entries and remove repeats, keeping first occurrence
pub fn dedup_parts<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    parts
        .into_iter()
        .map(|p| p.as_ref().trim().to_string())
        .filter(|p| !p.is_empty())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
