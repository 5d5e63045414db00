//! Row selection over cleaned tables.
//!
//! A [`RecordFilter`] narrows a [`CleanedTable`] to a year range and a set of
//! journals, the two selections a dashboard exposes. Filtering happens after
//! cleaning, so the filtered table keeps the summary of the cleaning run.

use std::collections::BTreeSet;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SchemaError;
use crate::types::{CleanedTable, columns};

// ============================================================================
// Record Filter
// ============================================================================

/// Row selection over a cleaned table.
///
/// * `year_range` is inclusive on both ends; `None` means every year.
/// * An empty `journals` list means every journal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub year_range: Option<(i32, i32)>,
    pub journals: Vec<String>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(mut self, from: i32, to: i32) -> Self {
        self.year_range = Some((from, to));
        self
    }

    pub fn journals<I, S>(mut self, journals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.journals = journals.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the filter lets every row through.
    pub fn is_unconstrained(&self) -> bool {
        self.year_range.is_none() && self.journals.is_empty()
    }
}

// ============================================================================
// Filtering
// ============================================================================

impl CleanedTable {
    /// Keep the rows matching `filter`.
    ///
    /// A reversed year range selects nothing. Selecting journals on a table
    /// without a `journal` column selects nothing. The cleaning summary is
    /// carried over unchanged.
    pub fn filter(&self, filter: &RecordFilter) -> Result<CleanedTable, SchemaError> {
        if filter.is_unconstrained() {
            return Ok(self.clone());
        }

        let height = self.height();
        let mut keep = vec![true; height];

        if let Some((from, to)) = filter.year_range {
            let years = self.year_values()?;
            for (slot, year) in keep.iter_mut().zip(years) {
                *slot &= (from..=to).contains(&year);
            }
        }

        if !filter.journals.is_empty() {
            let wanted: BTreeSet<&str> = filter.journals.iter().map(String::as_str).collect();
            let journal = self.text_column(columns::JOURNAL)?;
            for (slot, value) in keep.iter_mut().zip(journal.iter(height)) {
                *slot &= value.is_some_and(|v| wanted.contains(v));
            }
        }

        let mask = BooleanChunked::new("keep".into(), keep.as_slice());
        let df = self.dataframe().filter(&mask)?;
        debug!("Filter kept {} of {} rows", df.height(), height);

        Ok(CleanedTable::new(df, self.summary().clone()))
    }
}

// ============================================================================
// Tests
// ============================================================================
