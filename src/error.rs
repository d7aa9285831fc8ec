//! Error types for the review sentiment pipeline

use thiserror::Error;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library
///
/// Only run-level failures live here. Per-record anomalies (missing fields,
/// other languages, unclassifiable text) are filtered and counted by the
/// stage that meets them.
#[derive(Error, Debug)]
pub enum Error {
    /// Input table is malformed or lacks required columns
    #[error("Failed to parse reviews: {0}")]
    ParseError(String),

    /// No listing satisfies the selection policy
    #[error("Listing selection failed: {0}")]
    SelectionError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A classifier call failed for one input
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// CSV reader/writer error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Network error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
