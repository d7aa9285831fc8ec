//! # Review Sentiment
//!
//! Guest-satisfaction trends from a reviews export: load the table, drop
//! incomplete rows, pick one listing, keep English comments, normalize the
//! text, score each comment with a three-class sentiment classifier and
//! aggregate the probabilities over time.
//!
//! ## Modules
//!
//! - `data` - Review records, CSV loading, cleaning, listing selection, synthetic data
//! - `text` - Comment normalization and language detection
//! - `sentiment` - Classifier contract, lexicon and hosted classifiers, scoring, aggregation
//! - `pipeline` - The end-to-end run and its per-stage report
//! - `export` - Period series and scored reviews as CSV/JSON
//! - `config` - Pipeline configuration (JSON, TOML, YAML)
//!
//! ## Example Usage
//!
//! ```no_run
//! use review_sentiment::{
//!     LexiconClassifier, PipelineConfig, ReviewPipeline, StopwordDetector,
//! };
//!
//! fn main() -> review_sentiment::Result<()> {
//!     let pipeline = ReviewPipeline::new(
//!         PipelineConfig::default(),
//!         Box::new(StopwordDetector::default()),
//!         Box::new(LexiconClassifier::new()),
//!     );
//!
//!     let output = pipeline.run_path("reviews.csv")?;
//!     for point in &output.series {
//!         println!("{} {:.3} ({} reviews)", point.label, point.score, point.review_count);
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod sentiment;
pub mod text;

// Re-exports for convenience
pub use config::{load_config, save_config, PipelineConfig};
pub use data::{
    CleanReport, ListingSelector, RawReview, Review, ReviewCleaner, ReviewLoader, Selection,
    SelectionPolicy, SyntheticReviews,
};
pub use error::{Error, Result};
pub use export::{write_scored_csv, write_series_csv, write_series_json};
pub use pipeline::{PipelineOutput, PipelineReport, ReviewPipeline};
pub use sentiment::{
    AggregationMetric, InferenceApiClassifier, LexiconClassifier, Period, PeriodScore,
    RollingPoint, ScoredReview, SentimentAggregator, SentimentClassifier, SentimentLabel,
    SentimentScorer, SentimentSummary, SentimentTriple,
};
pub use text::{
    Detection, Language, LanguageDetector, LanguageFilter, StopwordDetector, TextNormalizer,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration values
pub mod defaults {
    /// Minimum number of reviews a listing needs to be selectable
    pub const MIN_REVIEWS: usize = 20;

    /// Seed for the seeded listing draw
    pub const SELECTION_SEED: u64 = 42;

    /// Fewer alphabetic words than this cannot be assigned a language
    pub const MIN_DETECTION_WORDS: usize = 3;

    /// Maximum classifier input length in whitespace tokens
    pub const MAX_INPUT_TOKENS: usize = 512;

    /// Number of comments sent to the classifier per call
    pub const BATCH_SIZE: usize = 16;

    /// Trailing window (in reviews) for the rolling satisfaction signal
    pub const ROLLING_WINDOW: usize = 10;

    /// Tolerance for a probability triple summing to one
    pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

    /// Hosted model used by the inference API backend
    pub const INFERENCE_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";
}
