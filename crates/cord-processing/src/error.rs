//! Error types for the metadata cleaning and summarization pipeline.
//!
//! Each stage has its own error enum so callers can tell a failed load
//! from a structurally unusable column or a missing aggregate input:
//!
//! - [`LoadError`] - the source could not be read or parsed as CSV
//! - [`SchemaError`] - a column the cleaner needs as text is not scalar
//! - [`AggregationError`] - an aggregate's input column is entirely absent
//!
//! [`AnalysisError`] wraps all three for the pipeline and the CLI. It is
//! serializable as `{code, message}` so it can be embedded in JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a source into a record table.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The path does not exist.
    #[error("Input file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path exists but could not be read.
    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source contains no header row at all.
    #[error("Input is empty: a header row is required")]
    EmptyInput,

    /// The bytes are not valid UTF-8.
    #[error("Input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The CSV reader rejected the content.
    #[error("Failed to parse CSV: {0}")]
    Parse(#[from] polars::error::PolarsError),
}

impl LoadError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FILE_NOT_FOUND",
            Self::Io { .. } => "READ_FAILED",
            Self::EmptyInput => "EMPTY_INPUT",
            Self::Encoding(_) => "ENCODING_ERROR",
            Self::Parse(_) => "PARSE_FAILED",
        }
    }
}

/// A column exists but cannot be used the way cleaning needs it.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A text column holds nested values (lists, structs, arrays).
    #[error("Column '{column}' must hold scalar text values, found {dtype}")]
    NonScalarColumn { column: String, dtype: String },

    /// Polars failed while rebuilding the table.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl SchemaError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NonScalarColumn { .. } => "NON_SCALAR_COLUMN",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }
}

/// An aggregate could not be computed from the cleaned table.
#[derive(Error, Debug)]
pub enum AggregationError {
    /// The aggregate's input column is not present at all.
    ///
    /// A column full of `"Unknown"` is not this error; it aggregates fine.
    #[error("Cannot compute {aggregate}: column '{column}' is absent")]
    MissingColumn {
        aggregate: &'static str,
        column: &'static str,
    },

    /// Polars failed while reading the column.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl AggregationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::Polars(_) => "POLARS_ERROR",
        }
    }

    /// Whether this error only means the input column was never there.
    pub fn is_missing_column(&self) -> bool {
        matches!(self, Self::MissingColumn { .. })
    }
}

/// The main error type for the pipeline and the CLI.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] crate::config::ConfigValidationError),

    /// IO error wrapper (report and export files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(e) => e.error_code(),
            Self::Schema(e) => e.error_code(),
            Self::Aggregation(e) => e.error_code(),
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the failure came from the loading stage.
    pub fn is_load_error(&self) -> bool {
        match self {
            Self::Load(_) => true,
            Self::WithContext { source, .. } => source.is_load_error(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<AnalysisError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}
