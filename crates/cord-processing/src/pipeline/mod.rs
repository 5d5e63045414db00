//! Pipeline module.
//!
//! Runs load, clean and summarize in one call. Load and clean failures abort
//! the run; every aggregate carries its own result so one missing column
//! never hides the other views.

mod builder;

pub use builder::{Pipeline, PipelineBuilder};

use crate::error::AggregationError;
use crate::summarizer::Summarizer;
use crate::types::CleanedTable;
use std::collections::BTreeMap;

/// The four aggregate views of a cleaned table, each computed independently.
#[derive(Debug)]
pub struct Aggregates {
    pub year_counts: Result<BTreeMap<i32, usize>, AggregationError>,
    pub top_journals: Result<Vec<(String, usize)>, AggregationError>,
    pub source_counts: Result<BTreeMap<String, usize>, AggregationError>,
    pub top_title_words: Result<Vec<(String, usize)>, AggregationError>,
}

impl Aggregates {
    /// Compute every aggregate of `table`.
    pub fn compute(
        summarizer: &Summarizer,
        table: &CleanedTable,
        top_journals: usize,
        top_words: usize,
    ) -> Self {
        Self {
            year_counts: summarizer.year_counts(table),
            top_journals: summarizer.top_journals(table, top_journals),
            source_counts: summarizer.source_counts(table),
            top_title_words: summarizer.top_title_words(table, top_words),
        }
    }

    /// Aggregates that failed, by name.
    pub fn failures(&self) -> Vec<(&'static str, &AggregationError)> {
        [
            ("year_counts", self.year_counts.as_ref().err()),
            ("top_journals", self.top_journals.as_ref().err()),
            ("source_counts", self.source_counts.as_ref().err()),
            ("top_title_words", self.top_title_words.as_ref().err()),
        ]
        .into_iter()
        .filter_map(|(name, err)| err.map(|e| (name, e)))
        .collect()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().is_empty()
    }
}

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct PipelineResult {
    /// Description of the input, see [`crate::loader::DataSource::describe`].
    pub source: String,
    /// Rows and columns as loaded.
    pub raw_shape: (usize, usize),
    /// The cleaned (and, if configured, filtered) table.
    pub cleaned: CleanedTable,
    pub aggregates: Aggregates,
    pub duration_ms: u64,
}

impl PipelineResult {
    /// Rows and columns of the cleaned table.
    pub fn cleaned_shape(&self) -> (usize, usize) {
        (self.cleaned.height(), self.cleaned.dataframe().width())
    }
}
