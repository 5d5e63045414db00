use crate::error::{AggregationError, Result, ResultExt};
use crate::pipeline::PipelineResult;
use crate::types::CleaningSummary;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the JSON report inside the output directory.
pub const REPORT_FILE_NAME: &str = "summary_report.json";
/// File name of the cleaned table export inside the output directory.
pub const CLEANED_FILE_NAME: &str = "cleaned_metadata.csv";

// ============================================================================
// Report Types
// ============================================================================

/// Result of one aggregate as it appears in a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AggregateOutcome<T> {
    Ok { data: T },
    Failed { code: String, message: String },
}

impl<T> AggregateOutcome<T> {
    /// Convert an aggregate result, mapping its value with `convert`.
    pub fn from_result<U>(
        result: &std::result::Result<U, AggregationError>,
        convert: impl FnOnce(&U) -> T,
    ) -> Self {
        match result {
            Ok(value) => AggregateOutcome::Ok {
                data: convert(value),
            },
            Err(e) => AggregateOutcome::Failed {
                code: e.error_code().to_string(),
                message: e.to_string(),
            },
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            AggregateOutcome::Ok { data } => Some(data),
            AggregateOutcome::Failed { .. } => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, AggregateOutcome::Ok { .. })
    }
}

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCount {
    pub value: String,
    pub count: usize,
}

fn ranked(entries: &[(String, usize)]) -> Vec<RankedCount> {
    entries
        .iter()
        .map(|(value, count)| RankedCount {
            value: value.clone(),
            count: *count,
        })
        .collect()
}

/// Everything a pipeline run produced, in serializable form.
///
/// Used for JSON output to stdout (`--json`), the `summary_report.json`
/// file, and the console summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    /// Description of the input
    pub input: String,
    /// Path of the cleaned CSV export, if one was written
    pub cleaned_file: Option<String>,
    pub duration_ms: u64,

    pub raw_rows: usize,
    pub raw_columns: usize,
    pub cleaned_rows: usize,
    pub cleaned_columns: usize,

    /// What the cleaner did
    pub cleaning: CleaningSummary,

    pub year_counts: AggregateOutcome<BTreeMap<i32, usize>>,
    pub top_journals: AggregateOutcome<Vec<RankedCount>>,
    pub source_counts: AggregateOutcome<BTreeMap<String, usize>>,
    pub top_title_words: AggregateOutcome<Vec<RankedCount>>,
}

impl SummaryReport {
    /// Build a report from a pipeline result.
    pub fn from_result(result: &PipelineResult) -> Self {
        let aggregates = &result.aggregates;
        let (cleaned_rows, cleaned_columns) = result.cleaned_shape();

        Self {
            generated_at: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            input: result.source.clone(),
            cleaned_file: None,
            duration_ms: result.duration_ms,
            raw_rows: result.raw_shape.0,
            raw_columns: result.raw_shape.1,
            cleaned_rows,
            cleaned_columns,
            cleaning: result.cleaned.summary().clone(),
            year_counts: AggregateOutcome::from_result(&aggregates.year_counts, Clone::clone),
            top_journals: AggregateOutcome::from_result(&aggregates.top_journals, |v| ranked(v)),
            source_counts: AggregateOutcome::from_result(&aggregates.source_counts, Clone::clone),
            top_title_words: AggregateOutcome::from_result(&aggregates.top_title_words, |v| {
                ranked(v)
            }),
        }
    }

    /// Human-readable summary for the console.
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Input: {}", self.input)?;
        writeln!(f, "Raw shape: ({}, {})", self.raw_rows, self.raw_columns)?;
        writeln!(
            f,
            "Clean shape: ({}, {})",
            self.cleaned_rows, self.cleaned_columns
        )?;
        writeln!(
            f,
            "Rows removed: {} ({:.1}%)",
            self.cleaning.rows_removed(),
            self.cleaning.rows_removed_percentage()
        )?;

        if !self.cleaning.missing_after.is_empty() {
            writeln!(f, "\nMissing values after clean:")?;
            for (column, count) in &self.cleaning.missing_after {
                writeln!(f, "  {column}: {count}")?;
            }
        }

        writeln!(f, "\nPublications per year:")?;
        match &self.year_counts {
            AggregateOutcome::Ok { data } => {
                for (year, count) in data {
                    writeln!(f, "  {year}: {count}")?;
                }
            }
            failed => write_failure(f, failed)?,
        }

        write_ranking(f, "Top journals", &self.top_journals)?;

        writeln!(f, "\nSources:")?;
        match &self.source_counts {
            AggregateOutcome::Ok { data } => {
                for (source, count) in data {
                    writeln!(f, "  {source}: {count}")?;
                }
            }
            failed => write_failure(f, failed)?,
        }

        write_ranking(f, "Top title words", &self.top_title_words)
    }
}

fn write_ranking(
    f: &mut fmt::Formatter<'_>,
    heading: &str,
    outcome: &AggregateOutcome<Vec<RankedCount>>,
) -> fmt::Result {
    writeln!(f, "\n{heading}:")?;
    match outcome {
        AggregateOutcome::Ok { data } => {
            for (rank, entry) in data.iter().enumerate() {
                writeln!(f, "  {:>2}. {} ({})", rank + 1, entry.value, entry.count)?;
            }
            Ok(())
        }
        failed => write_failure(f, failed),
    }
}

fn write_failure<T>(f: &mut fmt::Formatter<'_>, outcome: &AggregateOutcome<T>) -> fmt::Result {
    match outcome {
        AggregateOutcome::Failed { code, message } => {
            writeln!(f, "  unavailable [{code}]: {message}")
        }
        AggregateOutcome::Ok { .. } => Ok(()),
    }
}

// ============================================================================
// ReportGenerator
// ============================================================================

/// Paths written by [`ReportGenerator::write`].
#[derive(Debug, Clone)]
pub struct ReportFiles {
    pub report: PathBuf,
    pub cleaned: Option<PathBuf>,
}

/// Writes reports and cleaned tables into an output directory.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    write_cleaned: bool,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new(PathBuf::from("out"))
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            write_cleaned: false,
        }
    }

    /// Also export the cleaned table as CSV.
    pub fn with_cleaned_export(mut self, enabled: bool) -> Self {
        self.write_cleaned = enabled;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the report (and the cleaned table, if enabled) for `result`.
    ///
    /// Creates the output directory if needed. Returns the written report.
    pub fn write(&self, result: &PipelineResult) -> Result<(SummaryReport, ReportFiles)> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory {}",
            self.output_dir.display()
        ))?;

        let mut report = SummaryReport::from_result(result);

        let cleaned = if self.write_cleaned {
            let path = self.write_cleaned_csv(result)?;
            report.cleaned_file = Some(path.display().to_string());
            Some(path)
        } else {
            None
        };

        let report_path = self.write_report_to_file(&report)?;
        Ok((
            report,
            ReportFiles {
                report: report_path,
                cleaned,
            },
        ))
    }

    /// Write `report` as pretty JSON to `summary_report.json`.
    pub fn write_report_to_file(&self, report: &SummaryReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(REPORT_FILE_NAME);
        let mut file = File::create(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());
        Ok(report_path)
    }

    /// Write the cleaned table to `cleaned_metadata.csv`.
    pub fn write_cleaned_csv(&self, result: &PipelineResult) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_dir.join(CLEANED_FILE_NAME);
        let file = File::create(&output_path)
            .context(format!("Failed to create {}", output_path.display()))?;
        result.cleaned.write_csv(BufWriter::new(file))?;

        info!("Dataset saved: {}", output_path.display());
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;

    const CSV: &str = "\
title,journal,source_x,publish_time,abstract
Vaccine trial,Lancet,PMC,2020-03-01,a b
Vaccine safety,,WHO,2021-05-05,
Bad date,Nature,PMC,someday,x
";

    fn run(csv: &str) -> PipelineResult {
        Pipeline::builder()
            .build()
            .unwrap()
            .run(csv.as_bytes().to_vec())
            .unwrap()
    }

    #[test]
    fn test_report_from_result() {
        let report = SummaryReport::from_result(&run(CSV));

        assert_eq!(report.raw_rows, 3);
        assert_eq!(report.cleaned_rows, 2);
        assert_eq!(report.cleaning.dropped_unparseable_date, 1);
        assert_eq!(
            report.top_journals.data().unwrap()[0],
            RankedCount {
                value: "Lancet".to_string(),
                count: 1
            }
        );
        assert!(report.source_counts.is_ok());
    }

    #[test]
    fn test_failed_aggregate_serializes_code() {
        let csv = "title,publish_time\nA study,2020-01-01\n";
        let report = SummaryReport::from_result(&run(csv));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["top_journals"]["status"], "failed");
        assert_eq!(json["top_journals"]["code"], "MISSING_COLUMN");
        assert_eq!(json["year_counts"]["status"], "ok");
        assert_eq!(json["year_counts"]["data"]["2020"], 1);
    }

    #[test]
    fn test_text_summary() {
        let text = SummaryReport::from_result(&run(CSV)).to_text();

        assert!(text.contains("Raw shape: (3, 5)"));
        assert!(text.contains("Clean shape: (2, 7)"));
        assert!(text.contains("journal: 0"));
        assert!(text.contains("2020: 1"));
        assert!(text.contains("1. vaccine (2)"));
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_text_summary_lists_failed_aggregates() {
        let csv = "title,publish_time\nVaccine trial,2020-01-01\n";
        let report = SummaryReport::from_result(&run(csv));

        let text = format!("{report}");
        assert_eq!(text, report.to_text());
        assert!(text.contains("Top journals:\n  unavailable [MISSING_COLUMN]"));
        assert!(text.contains("Sources:\n  unavailable [MISSING_COLUMN]"));
        assert!(text.contains("Publications per year:\n  2020: 1"));
    }

    #[test]
    fn test_write_report_and_cleaned_csv() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let generator = ReportGenerator::new(&out).with_cleaned_export(true);

        let (report, files) = generator.write(&run(CSV)).unwrap();

        assert_eq!(files.report, out.join(REPORT_FILE_NAME));
        assert!(files.report.exists());
        let cleaned = files.cleaned.unwrap();
        assert!(cleaned.exists());
        assert_eq!(report.cleaned_file, Some(cleaned.display().to_string()));

        let json = fs::read_to_string(&files.report).unwrap();
        let parsed: SummaryReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.cleaned_rows, 2);
    }

    #[test]
    fn test_cleaned_export_is_opt_in() {
        let dir = tempfile::tempdir().unwrap();
        let (_, files) = ReportGenerator::new(dir.path()).write(&run(CSV)).unwrap();

        assert!(files.cleaned.is_none());
        assert!(!dir.path().join(CLEANED_FILE_NAME).exists());
    }
}
