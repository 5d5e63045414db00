//! Cleaning of raw metadata tables.
//!
//! The cleaner turns a [`RecordTable`] into a [`CleanedTable`]:
//! - Validates that the text columns it reads hold scalar values
//! - Parses `publish_time` and drops rows whose date is missing or unparseable
//! - Optionally drops rows without a title
//! - Derives `year` and `abstract_word_count`
//! - Replaces missing `journal` / `source_x` values with `"Unknown"`
//!
//! Dropping a row for a bad date is not an error. The counts end up in the
//! table's [`CleaningSummary`].

mod dates;
mod sanitizers;

pub use dates::parse_publish_time;

use crate::config::AnalysisConfig;
use crate::error::SchemaError;
use crate::types::{CleanedTable, CleaningSummary, RecordTable, TextColumn, columns};
use crate::utils::{count_blank, date_series, is_blank, whitespace_token_count};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Why a row did not survive cleaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowVerdict {
    Keep(NaiveDate),
    MissingDate,
    UnparseableDate,
    MissingTitle,
}

/// Cleans record tables.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    drop_missing_title: bool,
    date_drop_warning_ratio: f64,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl DataCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            drop_missing_title: config.drop_missing_title,
            date_drop_warning_ratio: config.date_drop_warning_ratio,
        }
    }

    /// Also drop rows whose title is missing.
    pub fn with_drop_missing_title(mut self, drop: bool) -> Self {
        self.drop_missing_title = drop;
        self
    }

    /// Clean `table` into a new table.
    ///
    /// Fails only when a text column is structurally unusable (nested
    /// values). A header-only table cleans to zero rows.
    pub fn clean(&self, table: RecordTable) -> Result<CleanedTable, SchemaError> {
        let rows_before = table.height();
        info!("Cleaning {} records...", rows_before);

        for name in columns::TEXT_COLUMNS {
            table.text_column(name)?;
        }

        let mut summary = CleaningSummary {
            rows_before,
            ..Default::default()
        };

        // 1. Decide which rows survive
        let verdicts = self.judge_rows(&table)?;
        let mut keep = Vec::with_capacity(rows_before);
        let mut dates = Vec::with_capacity(rows_before);
        for verdict in &verdicts {
            match verdict {
                RowVerdict::Keep(date) => {
                    keep.push(true);
                    dates.push(*date);
                }
                RowVerdict::MissingDate => {
                    keep.push(false);
                    summary.dropped_missing_date += 1;
                }
                RowVerdict::UnparseableDate => {
                    keep.push(false);
                    summary.dropped_unparseable_date += 1;
                }
                RowVerdict::MissingTitle => {
                    keep.push(false);
                    summary.dropped_missing_title += 1;
                }
            }
        }

        let mask = BooleanChunked::new("keep".into(), keep.as_slice());
        let mut df = table.into_dataframe().filter(&mask)?;
        record_drops(&mut summary);

        // 2. Normalized date and derived year
        let years: Vec<i32> = dates.iter().map(|date| date.year()).collect();
        df.with_column(date_series(columns::PUBLISH_TIME, &dates))?;
        df.with_column(Series::new(columns::YEAR.into(), years))?;
        summary
            .actions
            .push(format!("Parsed {} publish dates and derived year", dates.len()));

        // 3. Abstract length
        let word_counts = abstract_word_counts(&df)?;
        df.with_column(Series::new(columns::ABSTRACT_WORD_COUNT.into(), word_counts))?;
        summary
            .actions
            .push("Derived abstract word counts".to_string());

        // 4. Categorical imputation
        for name in columns::IMPUTED_COLUMNS {
            if let Some(replaced) = sanitizers::impute_unknown(&mut df, name)? {
                summary.imputed.insert(name.to_string(), replaced);
                if replaced > 0 {
                    summary.actions.push(format!(
                        "Replaced {} missing '{}' values with \"{}\"",
                        replaced,
                        name,
                        crate::types::UNKNOWN
                    ));
                }
            }
        }

        summary.rows_after = df.height();
        summary.missing_after = missing_counts(&df)?;
        self.warn_on_heavy_loss(&summary);

        info!(
            "Cleaning complete: {} -> {} rows",
            summary.rows_before, summary.rows_after
        );
        Ok(CleanedTable::new(df, summary))
    }

    fn judge_rows(&self, table: &RecordTable) -> Result<Vec<RowVerdict>, SchemaError> {
        let len = table.height();
        let publish_time = table.text_column(columns::PUBLISH_TIME)?;
        let title = table.text_column(columns::TITLE)?;

        if publish_time.is_absent() {
            debug!("No publish_time column, every row lacks a date");
        }

        let verdicts = publish_time
            .iter(len)
            .zip(title.iter(len))
            .map(|(raw_date, raw_title)| {
                let Some(raw_date) = raw_date.filter(|v| !v.trim().is_empty()) else {
                    return RowVerdict::MissingDate;
                };
                let Some(date) = parse_publish_time(raw_date) else {
                    return RowVerdict::UnparseableDate;
                };
                if self.drop_missing_title && is_blank(raw_title) {
                    return RowVerdict::MissingTitle;
                }
                RowVerdict::Keep(date)
            })
            .collect();

        Ok(verdicts)
    }

    fn warn_on_heavy_loss(&self, summary: &CleaningSummary) {
        if summary.rows_before == 0 {
            return;
        }
        let dropped = summary.dropped_missing_date + summary.dropped_unparseable_date;
        let ratio = dropped as f64 / summary.rows_before as f64;
        if ratio > self.date_drop_warning_ratio {
            warn!(
                "{:.1}% of rows were dropped for missing or unparseable dates",
                ratio * 100.0
            );
        }
    }
}

/// Clean `table` with default settings.
pub fn clean(table: RecordTable) -> Result<CleanedTable, SchemaError> {
    DataCleaner::default().clean(table)
}

fn record_drops(summary: &mut CleaningSummary) {
    let drops = [
        (summary.dropped_missing_date, "missing publish_time"),
        (summary.dropped_unparseable_date, "unparseable publish_time"),
        (summary.dropped_missing_title, "missing title"),
    ];

    let mut actions = Vec::new();
    for (count, reason) in drops {
        if count > 0 {
            debug!("Dropped {} rows with {}", count, reason);
            actions.push(format!("Dropped {} rows with {}", count, reason));
        }
    }

    if actions.is_empty() {
        actions.push("No rows dropped".to_string());
    }
    summary.actions.extend(actions);
}

fn abstract_word_counts(df: &DataFrame) -> Result<Vec<u32>, SchemaError> {
    let abstract_text = TextColumn::from_frame(df, columns::ABSTRACT)?;
    Ok(abstract_text
        .iter(df.height())
        .map(|text| text.map_or(0, whitespace_token_count) as u32)
        .collect())
}

fn missing_counts(df: &DataFrame) -> Result<BTreeMap<String, usize>, SchemaError> {
    let mut missing = BTreeMap::new();
    for name in [
        columns::TITLE,
        columns::PUBLISH_TIME,
        columns::JOURNAL,
        columns::SOURCE,
    ] {
        let column = TextColumn::from_frame(df, name)?;
        if let Some(count) = count_blank(&column, df.height()) {
            missing.insert(name.to_string(), count);
        }
    }
    Ok(missing)
}
