//! BOM source loading
//!
//! Reads delimited text exports (CSV, TSV or delimited `.txt`) and Excel
//! workbooks into [`RelationTable`]s through a [`ColumnMapping`]. Every file
//! is loaded independently: a failure is recorded for that file and loading
//! carries on with the rest.

use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use encoding_rs::{Encoding, WINDOWS_1252};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::relation::{ColumnMapping, RelationTable};

/// File extensions accepted as BOM sources
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["csv", "tsv", "txt", "xlsx", "xlsm", "xls"];

/// Extensions read as workbooks rather than delimited text
const WORKBOOK_EXTENSIONS: [&str; 3] = ["xlsx", "xlsm", "xls"];

const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Per-file load failure; never fatal on its own
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: file not found", .path.display())]
    NotFound { path: PathBuf },

    #[error("{}: unsupported file type '{extension}' (expected csv, tsv, txt, xlsx or xls)", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("{}: no header row", .path.display())]
    Empty { path: PathBuf },

    #[error("{}: missing required column(s): {}", .path.display(), .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },

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
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::UnsupportedFormat { path, .. }
            | LoadError::Empty { path }
            | LoadError::MissingColumns { path, .. }
            | LoadError::Io { path, .. }
            | LoadError::Csv { path, .. }
            | LoadError::Workbook { path, .. } => path,
        }
    }
}

/// Failure parsing in-memory table text
#[derive(Debug, Error)]
pub enum TableError {
    #[error("no header row")]
    Empty,

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl TableError {
    fn at(self, path: &Path) -> LoadError {
        let path = path.to_path_buf();
        match self {
            TableError::Empty => LoadError::Empty { path },
            TableError::MissingColumns(columns) => LoadError::MissingColumns { path, columns },
            TableError::Csv(source) => LoadError::Csv { path, source },
        }
    }
}

/// Options shared by every file of a load
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub columns: ColumnMapping,
    /// Field delimiter; sniffed from the header line when `None`
    pub delimiter: Option<u8>,
}

/// Tables that loaded and the files that did not
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub tables: Vec<RelationTable>,
    pub errors: Vec<LoadError>,
}

/// Pick the most frequent candidate delimiter in a header line
///
/// Falls back to a comma when no candidate appears.
pub fn sniff_delimiter(line: &str) -> u8 {
    let mut best = (b',', 0);
    for delim in CANDIDATE_DELIMITERS {
        let count = line.bytes().filter(|&b| b == delim).count();
        if count > best.1 {
            best = (delim, count);
        }
    }
    best.0
}

/// Decode file bytes as text
///
/// A byte-order mark decides the encoding when present. Otherwise valid
/// UTF-8 is used as is and anything else is read as Windows-1252, the
/// usual encoding of spreadsheet exports.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::debug!("input is not UTF-8, decoding as Windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text
        }
    }
}

/// Parse delimited text into a relation table
///
/// Rows that the CSV reader rejects are skipped, as are rows without a
/// product number. Missing descriptive columns read as empty strings.
pub fn parse_table(source_id: &str, data: &str, options: &LoadOptions) -> Result<RelationTable, TableError> {
    let data = data.trim_start_matches('\u{feff}');
    let header_line = data.lines().find(|l| !l.trim().is_empty()).ok_or(TableError::Empty)?;
    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(header_line));

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(true)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rejected = 0usize;
    let rows = reader.records().filter_map(|record| match record {
        Ok(record) => Some(record.iter().map(str::to_string).collect::<Vec<_>>()),
        Err(_) => {
            rejected += 1;
            None
        }
    });
    let table = table_from_rows(source_id, &headers, rows, options)?;

    if rejected > 0 {
        tracing::debug!(source = source_id, rejected, "skipped malformed rows");
    }
    Ok(table)
}

/// Build a relation table from a header row and data rows
///
/// Shared by delimited text and workbooks so both resolve columns the same
/// way.
pub fn table_from_rows<I>(
    source_id: &str,
    headers: &[String],
    rows: I,
    options: &LoadOptions,
) -> Result<RelationTable, TableError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(TableError::Empty);
    }
    let cols = options.columns.resolve(&headers).map_err(TableError::MissingColumns)?;

    let mut table = RelationTable::new(source_id);
    let mut skipped = 0usize;

    for row in rows {
        let field = |idx: Option<usize>| idx.and_then(|i| row.get(i)).map(String::as_str).unwrap_or("");

        let product_no = field(Some(cols.product_no));
        if product_no.trim().is_empty() {
            skipped += 1;
            continue;
        }

        table.push_edge(
            product_no,
            field(cols.product_name),
            field(Some(cols.component_no)),
            field(cols.name),
            field(cols.description),
        );
    }

    if skipped > 0 {
        tracing::debug!(source = source_id, skipped, "skipped rows without a product number");
    }

    Ok(table)
}

/// Read the first worksheet of a workbook as rows of cell text
///
/// Leading blank rows are dropped. Columns keep their sheet positions even
/// when the used range does not start in column A.
pub fn read_workbook_rows(path: &Path) -> Result<Vec<Vec<String>>, calamine::Error> {
    let mut workbook = open_workbook_auto(path)?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(&sheet)?;
    let offset = range.start().map(|(_, col)| col as usize).unwrap_or(0);

    Ok(range
        .rows()
        .map(|row| {
            std::iter::repeat(String::new())
                .take(offset)
                .chain(row.iter().map(|cell| cell.to_string()))
                .collect::<Vec<String>>()
        })
        .skip_while(|row| row.iter().all(|cell| cell.trim().is_empty()))
        .collect())
}

/// Load a workbook's first sheet; its first non-blank row is the header
fn load_workbook(path: &Path, options: &LoadOptions) -> Result<RelationTable, LoadError> {
    let rows = read_workbook_rows(path).map_err(|source| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rows = rows.into_iter();
    let headers = rows.next().ok_or_else(|| LoadError::Empty {
        path: path.to_path_buf(),
    })?;

    table_from_rows(&source_label(path), &headers, rows, options).map_err(|e| e.at(path))
}

/// Source label for a file: its base name
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_supported(path: &Path) -> bool {
    has_extension(path, &SUPPORTED_EXTENSIONS)
}

/// Whether a path names an Excel workbook
pub fn is_workbook(path: &Path) -> bool {
    has_extension(path, &WORKBOOK_EXTENSIONS)
}

/// Load a single BOM file
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<RelationTable, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    if !is_supported(path) {
        return Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default(),
        });
    }

    if is_workbook(path) {
        return load_workbook(path, options);
    }

    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data = decode_text(&bytes);

    parse_table(&source_label(path), &data, options).map_err(|e| e.at(path))
}

/// Load every file in order, collecting failures instead of stopping
///
/// Files sharing a base name get a numbered suffix so source labels stay
/// unique.
pub fn load_sources(paths: &[PathBuf], options: &LoadOptions) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();

    for path in paths {
        match load_table(path, options) {
            Ok(mut table) => {
                let base = table.source_id().to_string();
                let mut label = base.clone();
                let mut n = 2;
                while outcome.tables.iter().any(|t| t.source_id() == label) {
                    label = format!("{} ({})", base, n);
                    n += 1;
                }
                if label != base {
                    table = relabel(table, &label);
                }

                tracing::info!(source = %label, rows = table.len(), "loaded BOM source");
                outcome.tables.push(table);
            }
            Err(e) => {
                tracing::warn!("{}", e);
                outcome.errors.push(e);
            }
        }
    }

    outcome
}

fn relabel(table: RelationTable, label: &str) -> RelationTable {
    let mut renamed = RelationTable::new(label);
    for row in table.rows() {
        renamed.push_edge(
            &row.product_no,
            &row.product_name,
            &row.component_no,
            &row.name,
            &row.description,
        );
    }
    renamed
}

/// Find supported BOM files below a directory, sorted by path
pub fn find_source_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::NotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().to_string_lossy().starts_with("~$"))
        .map(|e| e.into_path())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();
    Ok(files)
}
