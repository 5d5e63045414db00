//! Shared utilities for the metadata pipeline.
//!
//! This module contains common helper functions used across multiple modules
//! to reduce code duplication and ensure consistency.

use chrono::NaiveDate;
use polars::prelude::*;

use crate::types::TextColumn;

// =============================================================================
// String Utilities
// =============================================================================

/// Check if a cell is missing: null, empty, or whitespace only.
#[inline]
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Number of whitespace-delimited tokens in a string.
///
/// # Example
///
/// ```rust,ignore
/// use cord_processing::utils::whitespace_token_count;
///
/// assert_eq!(whitespace_token_count("a  b\tc\n"), 3);
/// assert_eq!(whitespace_token_count("   "), 0);
/// ```
#[inline]
pub fn whitespace_token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Count the missing cells of a text column (see [`is_blank`]).
///
/// Returns `None` when the column is absent.
pub fn count_blank(column: &TextColumn, len: usize) -> Option<usize> {
    if column.is_absent() {
        return None;
    }
    Some(column.iter(len).filter(|v| is_blank(*v)).count())
}

// =============================================================================
// Date Utilities
// =============================================================================

/// Build a polars `Date` series from calendar dates.
pub fn date_series(name: &str, dates: &[NaiveDate]) -> Series {
    DateChunked::from_naive_date(name.into(), dates.iter().copied()).into_series()
}

// =============================================================================
// Tests
// =============================================================================
