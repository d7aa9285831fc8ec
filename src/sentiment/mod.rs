//! # Sentiment Module
//!
//! The three-class classifier contract, its implementations, per-review
//! scoring and the time-series aggregation of the scores.

mod aggregator;
mod classifier;
mod lexicon;
mod remote;
mod scorer;

pub use aggregator::{
    AggregationMetric, Period, PeriodScore, RollingPoint, SentimentAggregator, SentimentSummary,
};
pub use classifier::{SentimentClassifier, SentimentLabel, SentimentTriple};
pub use lexicon::{LexiconClassifier, LexiconResult, ReviewLexicon};
pub use remote::InferenceApiClassifier;
pub use scorer::{truncate_tokens, ScoreReport, ScoredReview, SentimentScorer};
