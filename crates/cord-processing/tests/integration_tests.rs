//! Integration tests for the metadata pipeline.
//!
//! These tests verify end-to-end behavior over the CSV fixtures.

use cord_processing::{
    AnalysisConfig, LoadError, Pipeline, RecordFilter, ReportGenerator, SummaryReport, clean,
    load, load_path, summarize_sources, summarize_title_words, summarize_top_journals,
    summarize_year_counts,
};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(filename: &str) -> PathBuf {
    fixtures_path().join(filename)
}

fn owned(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// ============================================================================
// Stage-by-stage on the sample file
// ============================================================================

#[test]
fn test_sample_load_keeps_every_row_and_column() {
    let table = load_path(fixture("metadata_sample.csv")).unwrap();

    assert_eq!(table.height(), 8);
    assert_eq!(table.column_names().len(), 8);
    assert!(table.has_column("url"));
}

#[test]
fn test_sample_clean() {
    let cleaned = clean(load_path(fixture("metadata_sample.csv")).unwrap()).unwrap();
    let summary = cleaned.summary();

    assert_eq!(cleaned.height(), 6);
    assert_eq!(summary.dropped_unparseable_date, 1);
    assert_eq!(summary.dropped_missing_date, 1);
    assert_eq!(summary.imputed.get("journal"), Some(&1));
    assert_eq!(summary.imputed.get("source_x"), Some(&0));
    assert_eq!(summary.missing_after.get("title"), Some(&1));
    assert_eq!(summary.missing_after.get("journal"), Some(&0));

    assert_eq!(cleaned.year_values().unwrap(), vec![2001, 2000, 2000, 2020, 2020, 2021]);
    assert_eq!(cleaned.abstract_word_counts().unwrap(), vec![8, 9, 0, 5, 6, 3]);
}

#[test]
fn test_sample_aggregates() {
    let cleaned = clean(load_path(fixture("metadata_sample.csv")).unwrap()).unwrap();

    assert_eq!(
        summarize_year_counts(&cleaned).unwrap(),
        BTreeMap::from([(2000, 2), (2001, 1), (2020, 2), (2021, 1)])
    );

    assert_eq!(
        summarize_top_journals(&cleaned, 3).unwrap(),
        owned(&[("Respir Res", 2), ("BMC Infect Dis", 1), ("Lancet", 1)])
    );

    assert_eq!(
        summarize_sources(&cleaned).unwrap(),
        BTreeMap::from([
            ("Elsevier".to_string(), 2),
            ("Medline".to_string(), 1),
            ("PMC".to_string(), 2),
            ("WHO".to_string(), 1),
        ])
    );

    // Every word occurs once: first-seen order decides
    assert_eq!(
        summarize_title_words(&cleaned, 3).unwrap(),
        owned(&[("clinical", 1), ("features", 1), ("culture", 1)])
    );
}

// ============================================================================
// Failure policy
// ============================================================================

#[test]
fn test_mostly_valid_file_returns_shorter_table() {
    let raw = load_path(fixture("mixed_dates.csv")).unwrap();
    let raw_rows = raw.height();
    let cleaned = clean(raw).unwrap();

    assert_eq!(raw_rows, 7);
    assert_eq!(cleaned.height(), 5);
    assert!(cleaned.height() < raw_rows);
    assert_eq!(
        summarize_year_counts(&cleaned).unwrap(),
        BTreeMap::from([(2019, 2), (2020, 3)])
    );
    assert_eq!(
        summarize_top_journals(&cleaned, 10).unwrap(),
        owned(&[("J1", 2), ("J3", 2), ("J2", 1)])
    );
}

#[test]
fn test_row_count_equal_when_every_date_parses() {
    let raw = load_path(fixture("no_journal.csv")).unwrap();
    let raw_rows = raw.height();
    let cleaned = clean(raw).unwrap();

    assert_eq!(cleaned.height(), raw_rows);
    assert_eq!(cleaned.summary().rows_removed(), 0);
}

#[test]
fn test_header_only_file() {
    let cleaned = clean(load_path(fixture("header_only.csv")).unwrap()).unwrap();

    assert!(cleaned.is_empty());
    assert!(summarize_year_counts(&cleaned).unwrap().is_empty());
    assert!(summarize_top_journals(&cleaned, 10).unwrap().is_empty());
    assert!(summarize_sources(&cleaned).unwrap().is_empty());
    assert!(summarize_title_words(&cleaned, 10).unwrap().is_empty());
}

#[test]
fn test_missing_journal_column_fails_only_that_aggregate() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture("no_journal.csv"))
        .unwrap();

    let aggregates = &result.aggregates;
    assert!(aggregates.top_journals.as_ref().unwrap_err().is_missing_column());
    assert_eq!(aggregates.year_counts.as_ref().unwrap().get(&2020), Some(&2));
    assert_eq!(aggregates.source_counts.as_ref().unwrap().len(), 2);
    assert_eq!(
        aggregates.top_title_words.as_ref().unwrap()[0],
        ("vaccine".to_string(), 2)
    );
}

#[test]
fn test_load_errors() {
    let err = load_path(fixture("does_not_exist.csv")).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));

    let err = load(Vec::<u8>::new()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyInput));

    let err = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture("does_not_exist.csv"))
        .unwrap_err();
    assert!(err.is_load_error());
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_cleaning_exported_table_again_loses_nothing() {
    let once = clean(load_path(fixture("metadata_sample.csv")).unwrap()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleaned.csv");
    once.write_csv(std::fs::File::create(&path).unwrap()).unwrap();

    let twice = clean(load_path(&path).unwrap()).unwrap();

    assert_eq!(twice.height(), once.height());
    assert_eq!(twice.summary().rows_removed(), 0);
    assert_eq!(twice.year_values().unwrap(), once.year_values().unwrap());
    assert_eq!(
        twice.abstract_word_counts().unwrap(),
        once.abstract_word_counts().unwrap()
    );
    assert_eq!(
        summarize_top_journals(&twice, 10).unwrap(),
        summarize_top_journals(&once, 10).unwrap()
    );
}

#[test]
fn test_identical_input_gives_identical_output() {
    let bytes = std::fs::read(fixture("mixed_dates.csv")).unwrap();

    let render = |input: Vec<u8>| {
        let cleaned = clean(load(input).unwrap()).unwrap();
        let mut out = Vec::new();
        cleaned.write_csv(&mut out).unwrap();
        out
    };

    assert_eq!(render(bytes.clone()), render(bytes));
}

#[test]
fn test_imputation_totality() {
    let cleaned = clean(load_path(fixture("metadata_sample.csv")).unwrap()).unwrap();

    for name in ["journal", "source_x"] {
        let column = cleaned.text_column(name).unwrap();
        for value in column.iter(cleaned.height()) {
            let value = value.unwrap();
            assert!(!value.trim().is_empty(), "blank {name} after cleaning");
        }
    }
}

// ============================================================================
// Pipeline, filters, configuration and reports
// ============================================================================

#[test]
fn test_pipeline_with_filter_and_config() {
    let config = AnalysisConfig::builder()
        .top_journals(2)
        .extra_stopwords(["clinical"])
        .build()
        .unwrap();

    let result = Pipeline::builder()
        .config(config)
        .filter(RecordFilter::new().years(2000, 2001))
        .build()
        .unwrap()
        .run(fixture("metadata_sample.csv"))
        .unwrap();

    assert_eq!(result.raw_shape, (8, 8));
    assert_eq!(result.cleaned.height(), 3);
    assert_eq!(
        result.aggregates.top_journals.as_ref().unwrap(),
        &owned(&[("Respir Res", 2), ("BMC Infect Dis", 1)])
    );
    assert_eq!(
        result.aggregates.top_title_words.as_ref().unwrap()[0],
        ("features".to_string(), 1)
    );
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{ "top_journals": 1, "drop_missing_title": true }"#,
    )
    .unwrap();

    let config = AnalysisConfig::from_json_file(&path).unwrap();
    assert_eq!(config.top_journals, 1);
    assert!(config.drop_missing_title);

    let result = Pipeline::builder()
        .config(config)
        .build()
        .unwrap()
        .run(fixture("metadata_sample.csv"))
        .unwrap();

    assert_eq!(result.cleaned.height(), 5);
    assert_eq!(result.cleaned.summary().dropped_missing_title, 1);
    assert_eq!(result.aggregates.top_journals.as_ref().unwrap().len(), 1);
}

#[test]
fn test_report_files() {
    let result = Pipeline::builder()
        .build()
        .unwrap()
        .run(fixture("no_journal.csv"))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (_, files) = ReportGenerator::new(dir.path())
        .with_cleaned_export(true)
        .write(&result)
        .unwrap();

    let report: SummaryReport =
        serde_json::from_str(&std::fs::read_to_string(&files.report).unwrap()).unwrap();
    assert_eq!(report.cleaned_rows, 2);
    assert!(!report.top_journals.is_ok());
    assert!(report.year_counts.is_ok());

    let exported = load_path(files.cleaned.unwrap()).unwrap();
    assert_eq!(exported.height(), 2);
    assert!(exported.has_column("year"));
}
