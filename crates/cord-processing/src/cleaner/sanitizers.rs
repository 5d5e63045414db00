//! Value sanitization for categorical columns.

use crate::error::SchemaError;
use crate::types::{TextColumn, UNKNOWN};
use crate::utils::is_blank;
use polars::prelude::*;
use tracing::debug;

/// Replace missing cells of `column` with [`UNKNOWN`], in place.
///
/// A cell is missing when it is null, empty or whitespace only. Other
/// values are kept exactly as written. Returns the number of replaced
/// cells, or `None` if the column is absent (it is not created).
pub(crate) fn impute_unknown(df: &mut DataFrame, column: &str) -> Result<Option<usize>, SchemaError> {
    let TextColumn::Present(values) = TextColumn::from_frame(df, column)? else {
        debug!("Column '{}' absent, nothing to impute", column);
        return Ok(None);
    };

    let mut replaced = 0usize;
    let filled: Vec<&str> = values
        .into_iter()
        .map(|value| {
            if is_blank(value) {
                replaced += 1;
                UNKNOWN
            } else {
                value.unwrap_or(UNKNOWN)
            }
        })
        .collect();

    let series = Series::new(column.into(), filled);
    df.replace(column, series)?;

    debug!("Imputed {} missing values in '{}'", replaced, column);
    Ok(Some(replaced))
}
