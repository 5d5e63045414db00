//! Publication Metadata Analysis Library
//!
//! Cleans bibliographic metadata tables (one row per publication) and
//! derives summary aggregates from them, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline has three stages, each consuming the previous stage's output:
//!
//! - **Loader**: reads a CSV file or buffer into a [`RecordTable`], every
//!   column as text, no column required
//! - **Cleaner**: parses `publish_time`, drops rows without a usable date,
//!   derives `year` and `abstract_word_count`, and fills missing `journal` /
//!   `source_x` values with `"Unknown"`, producing a [`CleanedTable`]
//! - **Summarizer**: publications per year, top journals, per-source counts
//!   and title word frequencies
//!
//! A row with a bad date is dropped and counted, never raised as an error.
//! Errors are [`LoadError`] (source unusable), [`SchemaError`] (a text column
//! holds nested values) and [`AggregationError`] (an aggregate's column is
//! absent).
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cord_processing::{clean, load, summarize_top_journals, summarize_year_counts};
//!
//! let table = load("data/metadata.csv")?;
//! let cleaned = clean(table)?;
//!
//! println!("{:?}", summarize_year_counts(&cleaned)?);
//! for (journal, count) in summarize_top_journals(&cleaned, 10)? {
//!     println!("{journal}: {count}");
//! }
//! ```
//!
//! # Pipeline
//!
//! [`Pipeline`] runs all stages, applies an optional [`RecordFilter`], and
//! keeps each aggregate's result separate so one missing column does not
//! hide the others:
//!
//! ```rust,ignore
//! use cord_processing::{AnalysisConfig, Pipeline, ReportGenerator};
//!
//! let config = AnalysisConfig::builder()
//!     .top_journals(5)
//!     .extra_stopwords(["patients", "study"])
//!     .build()?;
//!
//! let result = Pipeline::builder().config(config).build()?.run("data/metadata.csv")?;
//! let (report, _files) = ReportGenerator::new("out").write(&result)?;
//! println!("{}", report.to_text());
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod reporting;
pub mod summarizer;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{DataCleaner, clean, parse_publish_time};
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{
    AggregationError, AnalysisError, LoadError, Result as AnalysisResult, ResultExt, SchemaError,
};
pub use filter::RecordFilter;
pub use loader::{DataSource, LoadCache, load, load_path, load_reader, load_with_columns};
pub use pipeline::{Aggregates, Pipeline, PipelineBuilder, PipelineResult};
pub use reporting::{AggregateOutcome, RankedCount, ReportGenerator, SummaryReport};
pub use summarizer::{
    Stopwords, Summarizer, summarize_sources, summarize_title_words, summarize_top_journals,
    summarize_year_counts,
};
pub use types::{CleanedTable, CleaningSummary, RecordTable, TextColumn, UNKNOWN, columns};
