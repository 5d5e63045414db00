//! The `Pipeline` struct and its builder.

use super::{Aggregates, PipelineResult};
use crate::cleaner::DataCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::Result;
use crate::filter::RecordFilter;
use crate::loader::{self, DataSource};
use crate::summarizer::Summarizer;
use crate::types::RecordTable;
use std::time::Instant;
use tracing::{error, info, warn};

/// Load, clean and summarize a metadata table.
///
/// Use [`Pipeline::builder()`] to create a pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use cord_processing::{AnalysisConfig, Pipeline, RecordFilter};
///
/// let result = Pipeline::builder()
///     .config(AnalysisConfig::builder().top_journals(5).build()?)
///     .filter(RecordFilter::new().years(2020, 2021))
///     .build()?
///     .run("data/metadata.csv")?;
///
/// if let Ok(years) = &result.aggregates.year_counts {
///     println!("{years:?}");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: AnalysisConfig,
    filter: Option<RecordFilter>,
    cleaner: DataCleaner,
    summarizer: Summarizer,
}

// Pipeline may be handed to a worker thread by callers
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load `source` and run the remaining stages on it.
    ///
    /// # Errors
    ///
    /// Returns a load or schema error if the table cannot be read or
    /// cleaned. Aggregate failures are reported inside the result.
    pub fn run(&self, source: impl Into<DataSource>) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let source = source.into();
        let description = source.describe();

        info!("Step 1: Loading {}", description);
        let table = match &self.config.columns {
            Some(columns) => loader::load_with_columns(source, columns),
            None => loader::load(source),
        }
        .inspect_err(|e| error!("Pipeline error: {}", e))?;

        let mut result = self.run_table(table)?;
        result.source = description;
        result.duration_ms = start_time.elapsed().as_millis() as u64;
        Ok(result)
    }

    /// Run cleaning and summarization on an already loaded table, e.g. one
    /// served by a [`crate::loader::LoadCache`].
    pub fn run_table(&self, table: RecordTable) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let raw_shape = (table.height(), table.dataframe().width());

        info!("Step 2: Cleaning {} rows", raw_shape.0);
        let cleaned = self
            .cleaner
            .clean(table)
            .inspect_err(|e| error!("Pipeline error: {}", e))?;

        let cleaned = match &self.filter {
            Some(filter) => {
                info!("Step 3: Applying record filter");
                cleaned.filter(filter)?
            }
            None => cleaned,
        };

        info!("Step 4: Computing aggregates");
        let aggregates = Aggregates::compute(
            &self.summarizer,
            &cleaned,
            self.config.top_journals,
            self.config.top_words,
        );
        for (name, err) in aggregates.failures() {
            warn!("Aggregate '{}' unavailable: {}", name, err);
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline finished in {} ms", duration_ms);

        Ok(PipelineResult {
            source: "<table>".to_string(),
            raw_shape,
            cleaned,
            aggregates,
            duration_ms,
        })
    }
}

/// Builder for creating a configured [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    filter: Option<RecordFilter>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Restrict the summarized rows. An unconstrained filter is ignored.
    pub fn filter(mut self, filter: RecordFilter) -> Self {
        self.filter = (!filter.is_unconstrained()).then_some(filter);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            cleaner: DataCleaner::from_config(&config),
            summarizer: Summarizer::from_config(&config),
            filter: self.filter,
            config,
        })
    }
}
