//! Pipeline configuration
//!
//! Every section has defaults, so a configuration file only needs the values
//! it changes. Files are read and written as JSON, TOML or YAML depending on
//! their extension.

use crate::data::SelectionPolicy;
use crate::defaults;
use crate::error::{Error, Result};
use crate::logging;
use crate::sentiment::{AggregationMetric, Period};
use crate::text::Language;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input file settings
    pub input: InputSettings,
    /// Listing selection settings
    pub selection: SelectionSettings,
    /// Language filter settings
    pub language: LanguageSettings,
    /// Text normalization settings
    pub normalizer: NormalizerSettings,
    /// Sentiment classifier settings
    pub classifier: ClassifierSettings,
    /// Time-series settings
    pub aggregation: AggregationSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Input file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Field delimiter of the reviews file
    pub delimiter: char,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// How the analysed listing is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    /// Seeded random draw among qualifying listings
    #[default]
    Seeded,
    /// The listing with the most reviews
    MostReviewed,
    /// The listing named by `listing_id`
    Fixed,
}

/// Listing selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Minimum number of reviews for a listing to qualify
    pub min_reviews: usize,
    pub strategy: SelectionStrategy,
    /// Seed for the `seeded` strategy
    pub seed: u64,
    /// Listing for the `fixed` strategy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listing_id: Option<String>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            min_reviews: defaults::MIN_REVIEWS,
            strategy: SelectionStrategy::default(),
            seed: defaults::SELECTION_SEED,
            listing_id: None,
        }
    }
}

/// Language filter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSettings {
    /// ISO 639-1 code of the language to keep
    pub target: String,
    /// Minimum word count for a detection
    pub min_words: usize,
}

impl Default for LanguageSettings {
    fn default() -> Self {
        Self {
            target: "en".to_string(),
            min_words: defaults::MIN_DETECTION_WORDS,
        }
    }
}

/// Text normalization settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerSettings {
    /// Lowercase comments before scoring
    pub lowercase: bool,
}

/// Sentiment backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierBackend {
    /// Offline hospitality lexicon
    #[default]
    Lexicon,
    /// Hosted pretrained model over HTTP
    InferenceApi,
}

/// Sentiment classifier settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub backend: ClassifierBackend,
    /// Hosted model name
    pub model: String,
    /// Full endpoint URL, overriding the one derived from `model`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// API token (can be loaded from env)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// API token environment variable name
    pub api_token_env: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Inputs longer than this many tokens are truncated
    pub max_input_tokens: usize,
    /// Comments per classifier call
    pub batch_size: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            backend: ClassifierBackend::default(),
            model: defaults::INFERENCE_MODEL.to_string(),
            endpoint: None,
            api_token: None,
            api_token_env: "HF_API_TOKEN".to_string(),
            timeout_secs: 30,
            max_input_tokens: defaults::MAX_INPUT_TOKENS,
            batch_size: defaults::BATCH_SIZE,
        }
    }
}

impl ClassifierSettings {
    /// Get API token from config or environment
    pub fn get_api_token(&self) -> Option<String> {
        self.api_token
            .clone()
            .or_else(|| std::env::var(&self.api_token_env).ok())
            .filter(|token| !token.trim().is_empty())
    }
}

/// Time-series settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    pub period: Period,
    pub metric: AggregationMetric,
    /// Reviews in the trailing rolling mean
    pub rolling_window: usize,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            period: Period::default(),
            metric: AggregationMetric::default(),
            rolling_window: defaults::ROLLING_WINDOW,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Check that the settings are consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| -> Result<()> { Err(Error::ConfigError(message)) };

        self.delimiter()?;
        if self.selection.min_reviews == 0 {
            return invalid("selection.min_reviews must be at least 1".to_string());
        }
        if self.selection.strategy == SelectionStrategy::Fixed
            && self
                .selection
                .listing_id
                .as_deref()
                .map_or(true, |id| id.trim().is_empty())
        {
            return invalid("selection.strategy 'fixed' requires selection.listing_id".to_string());
        }
        self.target_language()?;
        if self.language.min_words == 0 {
            return invalid("language.min_words must be at least 1".to_string());
        }
        if self.classifier.batch_size == 0 {
            return invalid("classifier.batch_size must be at least 1".to_string());
        }
        if self.classifier.max_input_tokens == 0 {
            return invalid("classifier.max_input_tokens must be at least 1".to_string());
        }
        if self.classifier.timeout_secs == 0 {
            return invalid("classifier.timeout_secs must be at least 1".to_string());
        }
        if self.aggregation.rolling_window == 0 {
            return invalid("aggregation.rolling_window must be at least 1".to_string());
        }
        if !logging::is_valid_level(&self.logging.level) {
            return invalid(format!("unknown log level '{}'", self.logging.level));
        }

        Ok(())
    }

    /// Delimiter as a byte for the CSV reader
    pub fn delimiter(&self) -> Result<u8> {
        if self.input.delimiter.is_ascii() {
            Ok(self.input.delimiter as u8)
        } else {
            Err(Error::ConfigError(format!(
                "delimiter '{}' must be a single ASCII character",
                self.input.delimiter
            )))
        }
    }

    /// Language kept by the filter
    pub fn target_language(&self) -> Result<Language> {
        Language::from_code(&self.language.target).ok_or_else(|| {
            Error::ConfigError(format!(
                "unsupported target language '{}'",
                self.language.target
            ))
        })
    }

    /// Selection policy described by the selection settings
    pub fn selection_policy(&self) -> Result<SelectionPolicy> {
        match self.selection.strategy {
            SelectionStrategy::Seeded => Ok(SelectionPolicy::Seeded {
                seed: self.selection.seed,
            }),
            SelectionStrategy::MostReviewed => Ok(SelectionPolicy::MostReviewed),
            SelectionStrategy::Fixed => match &self.selection.listing_id {
                Some(id) if !id.trim().is_empty() => {
                    Ok(SelectionPolicy::Fixed(id.trim().to_string()))
                }
                _ => Err(Error::ConfigError(
                    "selection.strategy 'fixed' requires selection.listing_id".to_string(),
                )),
            },
        }
    }
}

fn extension(path: &Path) -> &str {
    path.extension().and_then(|e| e.to_str()).unwrap_or("")
}

/// Load and validate configuration from file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;

    let parse_error =
        |e: String| Error::ConfigError(format!("cannot parse {}: {}", path.display(), e));
    let config: PipelineConfig = match extension(path) {
        "json" => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        "toml" => toml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?,
        ext => {
            return Err(Error::ConfigError(format!(
                "unsupported config format '{}'",
                ext
            )))
        }
    };

    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config<P: AsRef<Path>>(config: &PipelineConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    let serialize_error = |e: String| Error::ConfigError(format!("cannot serialize config: {}", e));

    let content = match extension(path) {
        "json" => serde_json::to_string_pretty(config).map_err(|e| serialize_error(e.to_string()))?,
        "toml" => toml::to_string_pretty(config).map_err(|e| serialize_error(e.to_string()))?,
        "yaml" | "yml" => {
            serde_yaml::to_string(config).map_err(|e| serialize_error(e.to_string()))?
        }
        ext => {
            return Err(Error::ConfigError(format!(
                "unsupported config format '{}'",
                ext
            )))
        }
    };

    std::fs::write(path, content)?;
    Ok(())
}
