//! Report generation module.
//!
//! Turns a [`crate::pipeline::PipelineResult`] into a [`SummaryReport`] and
//! writes it out:
//! - JSON to stdout (`--json` CLI flag)
//! - `summary_report.json` in the output directory
//! - an optional `cleaned_metadata.csv` export of the cleaned table
//! - a plain-text summary for the console
//!
//! A failed aggregate is reported as `{"status": "failed", "code", "message"}`
//! next to the aggregates that succeeded.
//!
//! # Example
//!
//! ```rust,ignore
//! use cord_processing::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new("out").with_cleaned_export(true);
//! let (report, files) = generator.write(&pipeline_result)?;
//! println!("{}", report.to_text());
//! ```

mod generator;

pub use generator::{
    AggregateOutcome, CLEANED_FILE_NAME, REPORT_FILE_NAME, RankedCount, ReportFiles,
    ReportGenerator, SummaryReport,
};
