//! CSV loading for metadata tables.
//!
//! The loader reads a CSV file (or an in-memory buffer) into a
//! [`RecordTable`]. Schema inference is disabled so every column arrives as
//! text; deciding what a value means is the cleaner's job. No column is
//! required at load time.

mod cache;

pub use cache::LoadCache;

use crate::error::LoadError;
use crate::types::RecordTable;
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Where to read a table from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A file on disk.
    Path(PathBuf),
    /// Raw CSV bytes, e.g. an uploaded file.
    Bytes(Vec<u8>),
}

impl From<PathBuf> for DataSource {
    fn from(path: PathBuf) -> Self {
        DataSource::Path(path)
    }
}

impl From<&Path> for DataSource {
    fn from(path: &Path) -> Self {
        DataSource::Path(path.to_path_buf())
    }
}

impl From<&str> for DataSource {
    fn from(path: &str) -> Self {
        DataSource::Path(PathBuf::from(path))
    }
}

impl From<Vec<u8>> for DataSource {
    fn from(bytes: Vec<u8>) -> Self {
        DataSource::Bytes(bytes)
    }
}

impl DataSource {
    /// Short description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Bytes(bytes) => format!("<{} bytes in memory>", bytes.len()),
        }
    }
}

/// Load a table from a path or an in-memory buffer.
pub fn load(source: impl Into<DataSource>) -> Result<RecordTable, LoadError> {
    match source.into() {
        DataSource::Path(path) => load_path(path),
        DataSource::Bytes(bytes) => parse_csv_bytes(bytes),
    }
}

/// Load a table from a CSV file.
pub fn load_path(path: impl AsRef<Path>) -> Result<RecordTable, LoadError> {
    let path = path.as_ref();
    info!("Loading metadata from: {}", path.display());

    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_csv_bytes(bytes)?;
    info!(
        "Loaded {} rows x {} columns",
        table.height(),
        table.dataframe().width()
    );
    Ok(table)
}

/// Load a table from any reader, e.g. an open file or an upload buffer.
pub fn load_reader<R: Read>(mut reader: R) -> Result<RecordTable, LoadError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| LoadError::Io {
            path: PathBuf::from("<reader>"),
            source,
        })?;
    parse_csv_bytes(bytes)
}

/// Load a table and keep only `columns`, in file order.
///
/// Requested columns missing from the file are skipped rather than
/// reported; the dependent computation decides whether it needs them.
pub fn load_with_columns(
    source: impl Into<DataSource>,
    columns: &[String],
) -> Result<RecordTable, LoadError> {
    let table = load(source)?;
    select_present(table, columns)
}

pub(crate) fn select_present(
    table: RecordTable,
    columns: &[String],
) -> Result<RecordTable, LoadError> {
    let present: Vec<String> = table
        .column_names()
        .into_iter()
        .filter(|name| columns.iter().any(|c| c == name))
        .collect();

    let skipped = columns.len().saturating_sub(present.len());
    if skipped > 0 {
        debug!("{} requested columns not present in input", skipped);
    }

    let df = table.into_dataframe().select(present)?;
    Ok(RecordTable::new(df))
}

/// Parse raw CSV bytes with a header row into an all-text table.
fn parse_csv_bytes(mut bytes: Vec<u8>) -> Result<RecordTable, LoadError> {
    if bytes.starts_with(UTF8_BOM) {
        bytes.drain(..UTF8_BOM.len());
    }

    let text = std::str::from_utf8(&bytes)?;
    if text.trim().is_empty() {
        return Err(LoadError::EmptyInput);
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        // 0 disables inference: every column is read as String
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    debug!("Parsed CSV: {:?}", df.shape());
    Ok(RecordTable::new(df))
}
