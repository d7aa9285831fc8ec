//! # Review Pipeline
//!
//! Loader, cleaner, listing selector, language filter, normalizer, scorer
//! and aggregator run in that order over an explicit value. Each stage
//! returns what survived plus a report. Only malformed input and an
//! unsatisfiable selection abort the run.

use crate::config::{ClassifierBackend, PipelineConfig};
use crate::data::{
    CleanReport, ListingSelector, NormalizedReview, RawReview, ReviewCleaner, ReviewLoader,
};
use crate::error::Result;
use crate::sentiment::{
    InferenceApiClassifier, LexiconClassifier, PeriodScore, RollingPoint, ScoreReport,
    ScoredReview, SentimentAggregator, SentimentClassifier, SentimentScorer, SentimentSummary,
};
use crate::text::{
    LanguageDetector, LanguageFilter, LanguageReport, StopwordDetector, TextNormalizer,
};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Per-stage counts of one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    /// Rows read from the input
    pub loaded: usize,
    pub cleaning: CleanReport,
    /// Listing chosen for the run
    pub listing_id: String,
    /// Complete reviews of the chosen listing
    pub listing_reviews: usize,
    /// Listings that met the review threshold
    pub qualifying_listings: usize,
    pub language: LanguageReport,
    /// Reviews whose comment normalized to nothing
    pub normalized_empty: usize,
    pub scoring: ScoreReport,
    /// Periods in the output series
    pub periods: usize,
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows loaded:          {}", self.loaded)?;
        writeln!(
            f,
            "Complete reviews:     {} (removed {}: {} without comment, {} without reviewer)",
            self.cleaning.kept,
            self.cleaning.removed,
            self.cleaning.missing_comment,
            self.cleaning.missing_reviewer
        )?;
        writeln!(
            f,
            "Listing:              {} ({} reviews, {} listings qualified)",
            self.listing_id, self.listing_reviews, self.qualifying_listings
        )?;
        writeln!(
            f,
            "Target language:      {} kept, {} other, {} undetermined",
            self.language.kept, self.language.dropped_other, self.language.dropped_undetermined
        )?;
        writeln!(
            f,
            "Scored:               {} ({} empty, {} failed, {} truncated)",
            self.scoring.scored,
            self.scoring.skipped_empty,
            self.scoring.skipped_failed,
            self.scoring.truncated
        )?;
        write!(f, "Periods:              {}", self.periods)
    }
}

/// Everything a run produces
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub listing_id: String,
    /// Scored reviews in date order
    pub scored: Vec<ScoredReview>,
    /// Mean sentiment per period
    pub series: Vec<PeriodScore>,
    /// Trailing mean per review
    pub rolling: Vec<RollingPoint>,
    pub summary: SentimentSummary,
    pub report: PipelineReport,
}

/// End-to-end review sentiment pipeline
pub struct ReviewPipeline {
    config: PipelineConfig,
    detector: Box<dyn LanguageDetector>,
    classifier: Box<dyn SentimentClassifier>,
}

impl ReviewPipeline {
    /// Create a pipeline with explicit detector and classifier backends
    pub fn new(
        config: PipelineConfig,
        detector: Box<dyn LanguageDetector>,
        classifier: Box<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            config,
            detector,
            classifier,
        }
    }

    /// Create a pipeline whose backends are described by the configuration
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        config.validate()?;

        let detector = Box::new(StopwordDetector::new(config.language.min_words));
        let settings = &config.classifier;
        let classifier: Box<dyn SentimentClassifier> = match settings.backend {
            ClassifierBackend::Lexicon => Box::new(
                LexiconClassifier::new().with_max_input_tokens(settings.max_input_tokens),
            ),
            ClassifierBackend::InferenceApi => {
                let timeout = Duration::from_secs(settings.timeout_secs);
                let client = match &settings.endpoint {
                    Some(endpoint) => InferenceApiClassifier::new(endpoint.clone(), timeout)?,
                    None => InferenceApiClassifier::for_model(&settings.model, timeout)?,
                };
                Box::new(
                    client
                        .with_api_token(settings.get_api_token())
                        .with_max_input_tokens(settings.max_input_tokens),
                )
            }
        };

        Ok(Self::new(config, detector, classifier))
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Sentiment backend
    pub fn classifier(&self) -> &dyn SentimentClassifier {
        self.classifier.as_ref()
    }

    /// Name of the sentiment backend
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Load a reviews file and run the pipeline over it
    pub fn run_path<P: AsRef<Path>>(&self, path: P) -> Result<PipelineOutput> {
        let loader = ReviewLoader::new().with_delimiter(self.config.delimiter()?);
        let raw = loader.load(path)?;
        self.run(raw)
    }

    /// Run the pipeline over loaded rows
    pub fn run(&self, raw: Vec<RawReview>) -> Result<PipelineOutput> {
        self.config.validate()?;

        let mut report = PipelineReport {
            loaded: raw.len(),
            ..Default::default()
        };

        let (reviews, cleaning) = ReviewCleaner::new().clean(raw);
        report.cleaning = cleaning;

        let selector = ListingSelector::new(self.config.selection.min_reviews)
            .with_policy(self.config.selection_policy()?);
        let selection = selector.select(reviews)?;
        report.listing_id = selection.listing_id.clone();
        report.listing_reviews = selection.review_count;
        report.qualifying_listings = selection.qualifying_listings;

        let filter = LanguageFilter::new(self.config.target_language()?);
        let (reviews, language) = filter.filter(self.detector.as_ref(), selection.reviews);
        report.language = language;
        if reviews.is_empty() {
            warn!(
                listing_id = %report.listing_id,
                target_language = filter.target().code(),
                "No reviews left after language filtering"
            );
        }

        let normalizer = TextNormalizer::new().with_lowercase(self.config.normalizer.lowercase);
        let normalized: Vec<NormalizedReview> = reviews
            .into_iter()
            .map(|review| {
                let normalized_comment = normalizer.normalize(&review.comment);
                NormalizedReview {
                    review,
                    normalized_comment,
                }
            })
            .collect();
        report.normalized_empty = normalized
            .iter()
            .filter(|r| r.normalized_comment.is_empty())
            .count();

        let scorer = SentimentScorer::new(self.config.classifier.batch_size);
        let (mut scored, scoring) = scorer.score(self.classifier.as_ref(), normalized);
        report.scoring = scoring;

        let aggregation = &self.config.aggregation;
        let aggregator = SentimentAggregator::new(aggregation.period, aggregation.metric);
        SentimentAggregator::sort_by_date(&mut scored);
        let series = aggregator.aggregate(&scored);
        let rolling = aggregator.rolling(&scored, aggregation.rolling_window);
        let summary = aggregator.summary(&scored);
        report.periods = series.len();

        info!(
            listing_id = %report.listing_id,
            scored = scored.len(),
            periods = series.len(),
            period = %aggregation.period,
            metric = %aggregation.metric,
            mean = summary.mean,
            "Pipeline finished"
        );

        Ok(PipelineOutput {
            listing_id: selection.listing_id,
            scored,
            series,
            rolling,
            summary,
            report,
        })
    }
}
