//! CLI entry point for the metadata analysis pipeline.

use anyhow::{Result, anyhow};
use clap::Parser;
use cord_processing::{
    AnalysisConfig, Pipeline, PipelineResult, RecordFilter, ReportGenerator, SummaryReport,
};
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Clean publication metadata and summarize it",
    long_about = "Loads a publication metadata CSV, drops records without a usable \
                  publish date, fills missing journal/source values with \"Unknown\", \
                  and reports publications per year, top journals, sources and \
                  title word frequencies.\n\n\
                  EXAMPLES:\n  \
                  # Default input (data/metadata.csv) and output directory (out/)\n  \
                  cord-processing\n\n  \
                  # Restrict to 2020-2021 and two journals, export the cleaned table\n  \
                  cord-processing -i metadata.csv --year-from 2020 --year-to 2021 \\\n    \
                  --journal Lancet --journal Nature --write-cleaned\n\n  \
                  # Machine-readable report on stdout\n  \
                  cord-processing -i metadata.csv --json"
)]
struct Args {
    /// Path to the metadata CSV file
    #[arg(short, long, default_value = "data/metadata.csv")]
    input: PathBuf,

    /// Output directory for the report and exports
    #[arg(short, long, default_value = "out")]
    output: PathBuf,

    /// JSON configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of journals in the top-journals ranking
    #[arg(long)]
    top_journals: Option<usize>,

    /// Number of words in the title word ranking
    #[arg(long)]
    top_words: Option<usize>,

    /// Shortest title token that is counted
    #[arg(long)]
    min_token_length: Option<usize>,

    /// Additional stopword (repeatable)
    #[arg(long = "stopword", value_name = "WORD")]
    stopwords: Vec<String>,

    /// Also drop records without a title
    #[arg(long)]
    drop_missing_title: bool,

    /// First year to include (inclusive)
    #[arg(long)]
    year_from: Option<i32>,

    /// Last year to include (inclusive)
    #[arg(long)]
    year_to: Option<i32>,

    /// Journal to include (repeatable); all journals if omitted
    #[arg(long = "journal", value_name = "NAME")]
    journals: Vec<String>,

    /// Write the cleaned table to cleaned_metadata.csv
    #[arg(long)]
    write_cleaned: bool,

    /// Print the report as JSON to stdout instead of the text summary
    ///
    /// Disables logging so stdout contains only JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    // stdout carries only the JSON report
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let pipeline = Pipeline::builder()
        .config(config)
        .filter(build_filter(&args))
        .build()?;

    info!("{}", "=".repeat(60));
    info!("Analyzing {}", args.input.display());
    info!("{}", "=".repeat(60));

    let result = pipeline.run(args.input.as_path()).map_err(|e| {
        error!("Pipeline failed: {}", e);
        anyhow!("Pipeline failed [{}]: {}", e.error_code(), e)
    })?;

    handle_pipeline_output(&result, &args)
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };

    let mut builder = base.into_builder().extra_stopwords(args.stopwords.iter().cloned());

    if let Some(n) = args.top_journals {
        builder = builder.top_journals(n);
    }
    if let Some(n) = args.top_words {
        builder = builder.top_words(n);
    }
    if let Some(len) = args.min_token_length {
        builder = builder.min_token_length(len);
    }
    if args.drop_missing_title {
        builder = builder.drop_missing_title(true);
    }

    Ok(builder.build()?)
}

fn build_filter(args: &Args) -> RecordFilter {
    let mut filter = RecordFilter::new().journals(args.journals.iter().cloned());
    if args.year_from.is_some() || args.year_to.is_some() {
        filter = filter.years(
            args.year_from.unwrap_or(i32::MIN),
            args.year_to.unwrap_or(i32::MAX),
        );
    }
    filter
}

fn handle_pipeline_output(result: &PipelineResult, args: &Args) -> Result<()> {
    let generator = ReportGenerator::new(&args.output).with_cleaned_export(args.write_cleaned);
    let (report, files) = generator.write(result)?;

    info!("Report written to: {}", files.report.display());
    if let Some(cleaned) = &files.cleaned {
        info!("Cleaned table written to: {}", cleaned.display());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report);
    Ok(())
}

/// Print the summary for a terminal user.
///
/// Uses `println!` rather than logging so the summary shows regardless of
/// the log level.
fn print_human_readable_summary(report: &SummaryReport) {
    println!();
    println!("{}", "=".repeat(60));
    println!("ANALYSIS COMPLETE ({}ms)", report.duration_ms);
    println!("{}", "=".repeat(60));
    println!();
    print!("{}", report.to_text());

    if !report.cleaning.actions.is_empty() {
        println!();
        println!("Actions Taken:");
        for action in &report.cleaning.actions {
            println!("  - {}", action);
        }
    }
    println!();
}
