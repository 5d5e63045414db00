//! Table types flowing through the pipeline.
//!
//! - [`RecordTable`]: the raw table as loaded, every column as read.
//! - [`CleanedTable`]: the cleaner's output, which guarantees a parsed
//!   `publish_time`, a consistent `year`, an `abstract_word_count`, and
//!   no missing `journal` / `source_x` values when those columns exist.
//! - [`TextColumn`]: schema-tolerant access to a text column. An absent
//!   column and a present-but-null cell are different variants, so callers
//!   decide explicitly what an absent column means for them.

use crate::error::SchemaError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// Well-known column names of the metadata table.
pub mod columns {
    pub const TITLE: &str = "title";
    pub const ABSTRACT: &str = "abstract";
    pub const JOURNAL: &str = "journal";
    pub const SOURCE: &str = "source_x";
    pub const PUBLISH_TIME: &str = "publish_time";
    pub const AUTHORS: &str = "authors";

    /// Derived by the cleaner.
    pub const YEAR: &str = "year";
    /// Derived by the cleaner.
    pub const ABSTRACT_WORD_COUNT: &str = "abstract_word_count";

    /// Columns the cleaner and summarizer read as text.
    pub const TEXT_COLUMNS: [&str; 6] = [TITLE, ABSTRACT, JOURNAL, SOURCE, PUBLISH_TIME, AUTHORS];

    /// Categorical columns whose missing values become [`super::UNKNOWN`].
    pub const IMPUTED_COLUMNS: [&str; 2] = [JOURNAL, SOURCE];
}

/// Sentinel category substituted for missing categorical values.
pub const UNKNOWN: &str = "Unknown";

// ============================================================================
// TextColumn
// ============================================================================

/// A text column looked up by name.
#[derive(Debug, Clone)]
pub enum TextColumn {
    /// The table has no column with this name.
    Absent,
    /// The column exists; individual cells may still be null.
    Present(StringChunked),
}

impl TextColumn {
    /// Look up `name` in `df` as text.
    ///
    /// Non-string scalar columns (numbers, dates, booleans) are rendered as
    /// strings. Nested columns are rejected with
    /// [`SchemaError::NonScalarColumn`].
    pub fn from_frame(df: &DataFrame, name: &str) -> Result<Self, SchemaError> {
        let Ok(column) = df.column(name) else {
            return Ok(TextColumn::Absent);
        };

        let series = column.as_materialized_series();
        let dtype = series.dtype();

        if dtype.is_nested() {
            return Err(SchemaError::NonScalarColumn {
                column: name.to_string(),
                dtype: dtype.to_string(),
            });
        }

        if dtype == &DataType::String {
            return Ok(TextColumn::Present(series.str()?.clone()));
        }

        let as_text = series.cast(&DataType::String)?;
        Ok(TextColumn::Present(as_text.str()?.clone()))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, TextColumn::Absent)
    }

    /// Value at `idx`, or `None` if the column is absent or the cell is null.
    pub fn get(&self, idx: usize) -> Option<&str> {
        match self {
            TextColumn::Absent => None,
            TextColumn::Present(ca) => ca.get(idx),
        }
    }

    /// Iterate `len` cells. An absent column yields `len` nulls.
    pub fn iter(&self, len: usize) -> Box<dyn Iterator<Item = Option<&str>> + '_> {
        match self {
            TextColumn::Absent => Box::new(std::iter::repeat_n(None, len)),
            TextColumn::Present(ca) => Box::new(ca.into_iter()),
        }
    }
}

// ============================================================================
// RecordTable
// ============================================================================

/// The raw metadata table as produced by the loader.
#[derive(Debug, Clone)]
pub struct RecordTable {
    df: DataFrame,
}

impl RecordTable {
    pub fn new(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Number of records.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Schema-tolerant text access, see [`TextColumn`].
    pub fn text_column(&self, name: &str) -> Result<TextColumn, SchemaError> {
        TextColumn::from_frame(&self.df, name)
    }
}

impl From<DataFrame> for RecordTable {
    fn from(df: DataFrame) -> Self {
        Self::new(df)
    }
}

// ============================================================================
// CleanedTable
// ============================================================================

/// Output of the cleaner. Only the cleaner (and filtering, which keeps the
/// invariants) can construct one.
#[derive(Debug, Clone)]
pub struct CleanedTable {
    df: DataFrame,
    summary: CleaningSummary,
}

impl CleanedTable {
    pub(crate) fn new(df: DataFrame, summary: CleaningSummary) -> Self {
        Self { df, summary }
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_dataframe(self) -> DataFrame {
        self.df
    }

    /// Hand the rows back as a raw table, e.g. to clean them again.
    pub fn into_record_table(self) -> RecordTable {
        RecordTable::new(self.df)
    }

    /// What the cleaner did to produce this table.
    pub fn summary(&self) -> &CleaningSummary {
        &self.summary
    }

    /// Number of records.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df.column(name).is_ok()
    }

    /// Schema-tolerant text access, see [`TextColumn`].
    pub fn text_column(&self, name: &str) -> Result<TextColumn, SchemaError> {
        TextColumn::from_frame(&self.df, name)
    }

    /// The derived `year` of every row, in row order.
    pub fn year_values(&self) -> PolarsResult<Vec<i32>> {
        let years = self
            .df
            .column(columns::YEAR)?
            .as_materialized_series()
            .cast(&DataType::Int32)?;
        Ok(years.i32()?.into_iter().flatten().collect())
    }

    /// The derived `abstract_word_count` of every row, in row order.
    pub fn abstract_word_counts(&self) -> PolarsResult<Vec<u32>> {
        let counts = self
            .df
            .column(columns::ABSTRACT_WORD_COUNT)?
            .as_materialized_series()
            .cast(&DataType::UInt32)?;
        Ok(counts.u32()?.into_iter().flatten().collect())
    }

    /// Sorted distinct years, for year-range widgets.
    pub fn years(&self) -> Result<Vec<i32>, SchemaError> {
        let years: BTreeSet<i32> = self.year_values()?.into_iter().collect();
        Ok(years.into_iter().collect())
    }

    /// Sorted distinct journals, for journal pickers. Empty if the table
    /// has no journal column.
    pub fn journals(&self) -> Result<Vec<String>, SchemaError> {
        let journal = self.text_column(columns::JOURNAL)?;
        let journals: BTreeSet<&str> = journal.iter(self.height()).flatten().collect();
        Ok(journals.into_iter().map(str::to_string).collect())
    }

    /// Write the table as CSV with a header row.
    ///
    /// Dates are written as `YYYY-MM-DD`, so the output loads and cleans
    /// again without losing rows.
    pub fn write_csv<W: Write>(&self, writer: W) -> PolarsResult<()> {
        let mut df = self.df.clone();
        CsvWriter::new(writer)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
    }
}

// ============================================================================
// Cleaning summary
// ============================================================================

/// Human-readable account of one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    /// Number of rows handed to the cleaner.
    pub rows_before: usize,
    /// Number of rows in the cleaned table.
    pub rows_after: usize,
    /// Rows dropped because `publish_time` was missing or blank.
    pub dropped_missing_date: usize,
    /// Rows dropped because `publish_time` could not be parsed.
    pub dropped_unparseable_date: usize,
    /// Rows dropped because the title was missing (only when enabled).
    pub dropped_missing_title: usize,
    /// Cells replaced with the sentinel category, per column.
    pub imputed: BTreeMap<String, usize>,
    /// Missing cells left after cleaning, per key column present.
    pub missing_after: BTreeMap<String, usize>,
    /// Steps taken, in order.
    pub actions: Vec<String>,
}

impl CleaningSummary {
    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Percentage of rows removed (0.0 - 100.0).
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            self.rows_removed() as f64 / self.rows_before as f64 * 100.0
        }
    }
}

static_assertions::assert_impl_all!(RecordTable: Send);
static_assertions::assert_impl_all!(CleanedTable: Send);
