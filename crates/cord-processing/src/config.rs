//! Configuration types for the metadata analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of journals kept by the top-journals ranking.
pub const DEFAULT_TOP_JOURNALS: usize = 10;

/// Default number of words kept by the title word ranking.
pub const DEFAULT_TOP_WORDS: usize = 50;

/// Default minimum length (in characters) of a counted title token.
pub const DEFAULT_MIN_TOKEN_LENGTH: usize = 3;

/// Configuration for loading, cleaning and summarizing a metadata table.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use cord_processing::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .top_journals(5)
///     .extra_stopwords(["virus", "patients"])
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// How many journals the top-journals ranking returns.
    /// Default: 10
    pub top_journals: usize,

    /// How many words the title word ranking returns.
    /// Default: 50
    pub top_words: usize,

    /// Title tokens shorter than this many characters are not counted.
    /// Default: 3
    pub min_token_length: usize,

    /// Replacement stopword list. `None` uses the built-in list.
    /// Default: None
    pub stopwords: Option<Vec<String>>,

    /// Words added on top of whichever stopword list is active.
    /// Default: empty
    pub extra_stopwords: Vec<String>,

    /// Column subset to keep when loading. Names missing from the file
    /// are ignored. `None` keeps every column.
    /// Default: None
    pub columns: Option<Vec<String>>,

    /// Also drop rows whose title is missing or blank.
    /// Default: false
    pub drop_missing_title: bool,

    /// Share of rows dropped for bad dates above which a warning is logged
    /// (0.0 - 1.0).
    /// Default: 0.5
    pub date_drop_warning_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_journals: DEFAULT_TOP_JOURNALS,
            top_words: DEFAULT_TOP_WORDS,
            min_token_length: DEFAULT_MIN_TOKEN_LENGTH,
            stopwords: None,
            extra_stopwords: Vec::new(),
            columns: None,
            drop_missing_title: false,
            date_drop_warning_ratio: 0.5,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Read a configuration from a JSON file and validate it.
    ///
    /// Fields missing from the file take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Turn this configuration back into a builder, e.g. to apply overrides.
    pub fn into_builder(self) -> AnalysisConfigBuilder {
        AnalysisConfigBuilder {
            top_journals: Some(self.top_journals),
            top_words: Some(self.top_words),
            min_token_length: Some(self.min_token_length),
            stopwords: self.stopwords,
            extra_stopwords: self.extra_stopwords,
            columns: self.columns,
            drop_missing_title: Some(self.drop_missing_title),
            date_drop_warning_ratio: Some(self.date_drop_warning_ratio),
        }
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.top_journals == 0 {
            return Err(ConfigValidationError::InvalidTopN {
                field: "top_journals".to_string(),
            });
        }

        if self.top_words == 0 {
            return Err(ConfigValidationError::InvalidTopN {
                field: "top_words".to_string(),
            });
        }

        if self.min_token_length == 0 {
            return Err(ConfigValidationError::InvalidMinTokenLength);
        }

        if !(0.0..=1.0).contains(&self.date_drop_warning_ratio) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "date_drop_warning_ratio".to_string(),
                value: self.date_drop_warning_ratio,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': must be at least 1")]
    InvalidTopN { field: String },

    #[error("Invalid minimum token length: must be at least 1")]
    InvalidMinTokenLength,

    #[error("Invalid ratio for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidRatio { field: String, value: f64 },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    top_journals: Option<usize>,
    top_words: Option<usize>,
    min_token_length: Option<usize>,
    stopwords: Option<Vec<String>>,
    extra_stopwords: Vec<String>,
    columns: Option<Vec<String>>,
    drop_missing_title: Option<bool>,
    date_drop_warning_ratio: Option<f64>,
}

impl AnalysisConfigBuilder {
    /// Set how many journals the top-journals ranking returns.
    pub fn top_journals(mut self, n: usize) -> Self {
        self.top_journals = Some(n);
        self
    }

    /// Set how many words the title word ranking returns.
    pub fn top_words(mut self, n: usize) -> Self {
        self.top_words = Some(n);
        self
    }

    /// Set the minimum token length counted in title words.
    pub fn min_token_length(mut self, len: usize) -> Self {
        self.min_token_length = Some(len);
        self
    }

    /// Replace the built-in stopword list.
    pub fn stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stopwords = Some(words.into_iter().map(Into::into).collect());
        self
    }

    /// Add stopwords on top of the active list.
    pub fn extra_stopwords<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_stopwords.extend(words.into_iter().map(Into::into));
        self
    }

    /// Keep only these columns when loading.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Enable or disable dropping rows with a missing title.
    pub fn drop_missing_title(mut self, drop: bool) -> Self {
        self.drop_missing_title = Some(drop);
        self
    }

    /// Set the dropped-date share above which a warning is logged.
    ///
    /// # Arguments
    /// * `ratio` - Value between 0.0 and 1.0 (e.g., 0.5 = 50%)
    pub fn date_drop_warning_ratio(mut self, ratio: f64) -> Self {
        self.date_drop_warning_ratio = Some(ratio);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let config = AnalysisConfig {
            top_journals: self.top_journals.unwrap_or(DEFAULT_TOP_JOURNALS),
            top_words: self.top_words.unwrap_or(DEFAULT_TOP_WORDS),
            min_token_length: self.min_token_length.unwrap_or(DEFAULT_MIN_TOKEN_LENGTH),
            stopwords: self.stopwords,
            extra_stopwords: self.extra_stopwords,
            columns: self.columns,
            drop_missing_title: self.drop_missing_title.unwrap_or(false),
            date_drop_warning_ratio: self.date_drop_warning_ratio.unwrap_or(0.5),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.top_journals, 10);
        assert_eq!(config.top_words, 50);
        assert_eq!(config.min_token_length, 3);
        assert!(config.stopwords.is_none());
        assert!(!config.drop_missing_title);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let config = AnalysisConfig::builder().build().unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AnalysisConfig::builder()
            .top_journals(5)
            .top_words(100)
            .min_token_length(4)
            .extra_stopwords(["virus"])
            .extra_stopwords(vec!["patients".to_string()])
            .columns(["title", "journal"])
            .drop_missing_title(true)
            .build()
            .unwrap();

        assert_eq!(config.top_journals, 5);
        assert_eq!(config.top_words, 100);
        assert_eq!(config.min_token_length, 4);
        assert_eq!(config.extra_stopwords, vec!["virus", "patients"]);
        assert_eq!(
            config.columns,
            Some(vec!["title".to_string(), "journal".to_string()])
        );
        assert!(config.drop_missing_title);
    }

    #[test]
    fn test_validation_zero_top_n() {
        let result = AnalysisConfig::builder().top_journals(0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidTopN { .. }
        ));

        let result = AnalysisConfig::builder().top_words(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_invalid_ratio() {
        let result = AnalysisConfig::builder().date_drop_warning_ratio(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidRatio { .. }
        ));
    }

    #[test]
    fn test_into_builder_round_trip_with_override() {
        let base = AnalysisConfig::builder().top_words(7).build().unwrap();
        let config = base.into_builder().top_journals(3).build().unwrap();
        assert_eq!(config.top_words, 7);
        assert_eq!(config.top_journals, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "top_journals": 20, "extra_stopwords": ["review"] }"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.top_journals, 20);
        assert_eq!(config.top_words, DEFAULT_TOP_WORDS);
        assert_eq!(config.extra_stopwords, vec!["review"]);
    }

    #[test]
    fn test_from_json_file_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "min_token_length": 0 }"#).unwrap();

        let err = AnalysisConfig::from_json_file(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }
}
