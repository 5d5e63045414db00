//! Aggregate views over a cleaned table.
//!
//! Four independent aggregates, each computed on demand:
//! - Publications per year
//! - Top journals by publication count
//! - Publications per source
//! - Title word frequencies after stopword removal
//!
//! An aggregate fails with [`AggregationError::MissingColumn`] only when its
//! input column does not exist. A column full of `"Unknown"` aggregates
//! normally. Rankings break ties by first appearance in the table.

mod ranking;
mod tokenizer;

pub use tokenizer::{DEFAULT_STOPWORDS, Stopwords, tokenize};

use crate::config::{AnalysisConfig, DEFAULT_MIN_TOKEN_LENGTH};
use crate::error::AggregationError;
use crate::types::{CleanedTable, columns};
use polars::prelude::*;
use ranking::FrequencyCounter;
use std::collections::BTreeMap;
use tracing::debug;

/// Computes aggregate views with a configurable tokenizer policy.
#[derive(Debug, Clone)]
pub struct Summarizer {
    stopwords: Stopwords,
    min_token_length: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            stopwords: Stopwords::default(),
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
        }
    }
}

impl Summarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokenizer policy from configuration: `stopwords` replaces the
    /// built-in list, `extra_stopwords` extends whichever list is active.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let mut stopwords = match &config.stopwords {
            Some(words) => Stopwords::new(words),
            None => Stopwords::default(),
        };
        stopwords.extend(&config.extra_stopwords);

        Self {
            stopwords,
            min_token_length: config.min_token_length,
        }
    }

    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_min_token_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    pub fn stopwords(&self) -> &Stopwords {
        &self.stopwords
    }

    /// Number of records per year. Years without records are not listed.
    pub fn year_counts(&self, table: &CleanedTable) -> Result<BTreeMap<i32, usize>, AggregationError> {
        if !table.has_column(columns::YEAR) {
            return Err(AggregationError::MissingColumn {
                aggregate: "year counts",
                column: columns::YEAR,
            });
        }

        let mut counts = BTreeMap::new();
        for year in table.year_values()? {
            *counts.entry(year).or_insert(0) += 1;
        }

        debug!("Year counts: {} distinct years", counts.len());
        Ok(counts)
    }

    /// The `n` journals with the most records, most frequent first.
    pub fn top_journals(
        &self,
        table: &CleanedTable,
        n: usize,
    ) -> Result<Vec<(String, usize)>, AggregationError> {
        let journal = required_text(table, "top journals", columns::JOURNAL)?;

        let counter: FrequencyCounter<&str> = journal.into_iter().flatten().collect();
        debug!("Top journals: {} distinct journals", counter.len());

        Ok(counter
            .into_top(n)
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect())
    }

    /// Number of records per source. Every source is listed.
    pub fn source_counts(
        &self,
        table: &CleanedTable,
    ) -> Result<BTreeMap<String, usize>, AggregationError> {
        let source = required_text(table, "source counts", columns::SOURCE)?;

        let mut counts = BTreeMap::new();
        for value in source.into_iter().flatten() {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }

        debug!("Source counts: {} distinct sources", counts.len());
        Ok(counts)
    }

    /// Frequency of every title word, most frequent first.
    pub fn title_word_frequencies(
        &self,
        table: &CleanedTable,
    ) -> Result<Vec<(String, usize)>, AggregationError> {
        Ok(self.count_title_words(table)?.into_ranked())
    }

    /// The `n` most frequent title words.
    pub fn top_title_words(
        &self,
        table: &CleanedTable,
        n: usize,
    ) -> Result<Vec<(String, usize)>, AggregationError> {
        Ok(self.count_title_words(table)?.into_top(n))
    }

    fn count_title_words(
        &self,
        table: &CleanedTable,
    ) -> Result<FrequencyCounter<String>, AggregationError> {
        let title = required_text(table, "title words", columns::TITLE)?;

        let mut counter = FrequencyCounter::new();
        for text in title.into_iter().flatten() {
            for token in tokenizer::content_tokens(text, &self.stopwords, self.min_token_length) {
                counter.add(token);
            }
        }

        debug!("Title words: {} distinct tokens", counter.len());
        Ok(counter)
    }
}

/// Read `column` as text, failing if the table does not have it.
fn required_text(
    table: &CleanedTable,
    aggregate: &'static str,
    column: &'static str,
) -> Result<StringChunked, AggregationError> {
    let Ok(values) = table.dataframe().column(column) else {
        return Err(AggregationError::MissingColumn { aggregate, column });
    };

    let text = values.as_materialized_series().cast(&DataType::String)?;
    Ok(text.str()?.clone())
}

/// Records per year, see [`Summarizer::year_counts`].
pub fn summarize_year_counts(table: &CleanedTable) -> Result<BTreeMap<i32, usize>, AggregationError> {
    Summarizer::default().year_counts(table)
}

/// Top `n` journals, see [`Summarizer::top_journals`].
pub fn summarize_top_journals(
    table: &CleanedTable,
    n: usize,
) -> Result<Vec<(String, usize)>, AggregationError> {
    Summarizer::default().top_journals(table, n)
}

/// Records per source, see [`Summarizer::source_counts`].
pub fn summarize_sources(table: &CleanedTable) -> Result<BTreeMap<String, usize>, AggregationError> {
    Summarizer::default().source_counts(table)
}

/// Top `n` title words with the built-in stopwords, see
/// [`Summarizer::top_title_words`].
pub fn summarize_title_words(
    table: &CleanedTable,
    n: usize,
) -> Result<Vec<(String, usize)>, AggregationError> {
    Summarizer::default().top_title_words(table, n)
}
