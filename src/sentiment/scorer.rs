//! # Sentiment Scoring
//!
//! Runs each normalized comment through a [`SentimentClassifier`] and
//! attaches the resulting probability triple to the review. Inputs longer
//! than the model accepts are truncated, never rejected. Comments that are
//! empty or that the classifier cannot process are skipped and logged.

use super::classifier::{SentimentClassifier, SentimentLabel, SentimentTriple};
use crate::data::NormalizedReview;
use crate::defaults;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// A review with its sentiment probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredReview {
    pub listing_id: String,
    pub reviewer_name: String,
    pub date: NaiveDate,
    pub comment: String,
    pub normalized_comment: String,
    pub prob_negative: f64,
    pub prob_neutral: f64,
    pub prob_positive: f64,
}

impl ScoredReview {
    /// Attach a triple to a normalized review
    pub fn new(review: NormalizedReview, triple: SentimentTriple) -> Self {
        let NormalizedReview {
            review,
            normalized_comment,
        } = review;

        Self {
            listing_id: review.listing_id,
            reviewer_name: review.reviewer_name,
            date: review.date,
            comment: review.comment,
            normalized_comment,
            prob_negative: triple.negative,
            prob_neutral: triple.neutral,
            prob_positive: triple.positive,
        }
    }

    /// The probability triple
    pub fn triple(&self) -> SentimentTriple {
        SentimentTriple {
            negative: self.prob_negative,
            neutral: self.prob_neutral,
            positive: self.prob_positive,
        }
    }

    /// Positive minus negative probability
    pub fn composite(&self) -> f64 {
        self.prob_positive - self.prob_negative
    }

    /// Most probable class
    pub fn dominant(&self) -> SentimentLabel {
        self.triple().dominant()
    }
}

/// Counts produced by [`SentimentScorer::score`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    /// Reviews received
    pub input: usize,
    /// Reviews scored
    pub scored: usize,
    /// Skipped because normalization left nothing
    pub skipped_empty: usize,
    /// Skipped because the classifier failed or returned an invalid triple
    pub skipped_failed: usize,
    /// Scored after truncation to the model's input limit
    pub truncated: usize,
}

/// Keep the first `max_tokens` whitespace-separated tokens
///
/// Returns the text and whether anything was cut.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> (String, bool) {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() <= max_tokens {
        (text.to_string(), false)
    } else {
        (tokens[..max_tokens].join(" "), true)
    }
}

/// Scores reviews with a classifier
#[derive(Debug, Clone)]
pub struct SentimentScorer {
    batch_size: usize,
}

impl Default for SentimentScorer {
    fn default() -> Self {
        Self::new(defaults::BATCH_SIZE)
    }
}

impl SentimentScorer {
    /// Create a scorer sending `batch_size` comments per classifier call
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Score every review the classifier can handle
    pub fn score<C: SentimentClassifier + ?Sized>(
        &self,
        classifier: &C,
        reviews: Vec<NormalizedReview>,
    ) -> (Vec<ScoredReview>, ScoreReport) {
        let mut report = ScoreReport {
            input: reviews.len(),
            ..Default::default()
        };

        let (pending, empty): (Vec<NormalizedReview>, Vec<NormalizedReview>) = reviews
            .into_iter()
            .partition(|r| !r.normalized_comment.trim().is_empty());

        for review in &empty {
            debug!(
                reviewer = %review.review.reviewer_name,
                "Skipped review: empty after normalization"
            );
        }
        report.skipped_empty = empty.len();

        let max_tokens = classifier.max_input_tokens().max(1);
        let mut scored = Vec::with_capacity(pending.len());
        let mut pending = pending.into_iter().peekable();

        while pending.peek().is_some() {
            let chunk: Vec<NormalizedReview> = pending.by_ref().take(self.batch_size).collect();

            let inputs: Vec<String> = chunk
                .iter()
                .map(|r| {
                    let (text, truncated) = truncate_tokens(&r.normalized_comment, max_tokens);
                    if truncated {
                        report.truncated += 1;
                    }
                    text
                })
                .collect();
            let input_refs: Vec<&str> = inputs.iter().map(String::as_str).collect();

            let mut results = classifier.classify_batch(&input_refs).into_iter();

            for review in chunk {
                match results.next() {
                    Some(Ok(triple)) if triple.is_valid() => {
                        scored.push(ScoredReview::new(review, triple));
                    }
                    Some(Ok(triple)) => {
                        warn!(
                            reviewer = %review.review.reviewer_name,
                            ?triple,
                            "Skipped review: invalid probabilities"
                        );
                        report.skipped_failed += 1;
                    }
                    Some(Err(e)) => {
                        warn!(
                            reviewer = %review.review.reviewer_name,
                            error = %e,
                            "Skipped review: classifier failed"
                        );
                        report.skipped_failed += 1;
                    }
                    None => {
                        warn!(
                            reviewer = %review.review.reviewer_name,
                            "Skipped review: no classifier result"
                        );
                        report.skipped_failed += 1;
                    }
                }
            }
        }

        report.scored = scored.len();
        info!(
            classifier = classifier.name(),
            scored = report.scored,
            empty = report.skipped_empty,
            failed = report.skipped_failed,
            truncated = report.truncated,
            "Scored reviews"
        );

        (scored, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Review;
    use crate::error::{Error, Result};
    use crate::sentiment::LexiconClassifier;
    use std::cell::RefCell;

    /// Records what it was asked and fails on inputs containing "boom"
    struct RecordingClassifier {
        max_tokens: usize,
        seen: RefCell<Vec<String>>,
        calls: RefCell<usize>,
    }

    impl RecordingClassifier {
        fn new(max_tokens: usize) -> Self {
            Self {
                max_tokens,
                seen: RefCell::new(Vec::new()),
                calls: RefCell::new(0),
            }
        }
    }

    impl SentimentClassifier for RecordingClassifier {
        fn name(&self) -> &str {
            "recording"
        }

        fn max_input_tokens(&self) -> usize {
            self.max_tokens
        }

        fn classify(&self, text: &str) -> Result<SentimentTriple> {
            self.seen.borrow_mut().push(text.to_string());
            if text.contains("boom") {
                return Err(Error::ClassifierError("cannot classify".into()));
            }
            SentimentTriple::from_scores(0.2, 0.3, 0.5)
        }

        fn classify_batch(&self, texts: &[&str]) -> Vec<Result<SentimentTriple>> {
            *self.calls.borrow_mut() += 1;
            texts.iter().map(|t| self.classify(t)).collect()
        }
    }

    fn normalized(text: &str) -> NormalizedReview {
        NormalizedReview {
            review: Review {
                listing_id: "L1".into(),
                reviewer_name: "Guest".into(),
                comment: text.into(),
                date: NaiveDate::from_ymd_opt(2023, 4, 1).unwrap(),
            },
            normalized_comment: text.into(),
        }
    }

    #[test]
    fn test_truncate_tokens() {
        assert_eq!(truncate_tokens("a b c", 5), ("a b c".to_string(), false));
        assert_eq!(truncate_tokens("a b  c d", 2), ("a b".to_string(), true));
    }

    #[test]
    fn test_probabilities_are_valid() {
        let reviews = vec![
            normalized("Great stay, very clean!"),
            normalized("Terrible, dirty room."),
            normalized("It was okay."),
        ];
        let (scored, report) = SentimentScorer::default().score(&LexiconClassifier::new(), reviews);

        assert_eq!(report.scored, 3);
        for review in &scored {
            let sum = review.prob_negative + review.prob_neutral + review.prob_positive;
            assert!((sum - 1.0).abs() < 1e-6);
            for p in [review.prob_negative, review.prob_neutral, review.prob_positive] {
                assert!((0.0..=1.0).contains(&p));
            }
        }
    }

    #[test]
    fn test_skips_empty_and_failed() {
        let reviews = vec![
            normalized("fine"),
            normalized(""),
            normalized("boom goes the boiler"),
            normalized("nice"),
        ];
        let classifier = RecordingClassifier::new(512);
        let (scored, report) = SentimentScorer::new(2).score(&classifier, reviews);

        assert_eq!(scored.len(), 2);
        assert_eq!(report.skipped_empty, 1);
        assert_eq!(report.skipped_failed, 1);
        assert_eq!(report.input, 4);
        assert_eq!(*classifier.calls.borrow(), 2);
    }

    #[test]
    fn test_truncates_long_input() {
        let long = vec!["word"; 20].join(" ");
        let classifier = RecordingClassifier::new(5);
        let (scored, report) =
            SentimentScorer::default().score(&classifier, vec![normalized(&long)]);

        assert_eq!(scored.len(), 1);
        assert_eq!(report.truncated, 1);
        assert_eq!(classifier.seen.borrow()[0], "word word word word word");
        // The stored comment is the full normalized text
        assert_eq!(scored[0].normalized_comment, long);
    }

    #[test]
    fn test_batching_preserves_order() {
        let reviews: Vec<NormalizedReview> =
            (0..7).map(|i| normalized(&format!("comment {}", i))).collect();
        let classifier = RecordingClassifier::new(512);
        let (scored, _) = SentimentScorer::new(3).score(&classifier, reviews);

        let comments: Vec<&str> = scored.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(comments[0], "comment 0");
        assert_eq!(comments[6], "comment 6");
        assert_eq!(*classifier.calls.borrow(), 3);
    }

    /// Fails every call with a transport-style error
    struct UnreachableClassifier;

    impl SentimentClassifier for UnreachableClassifier {
        fn name(&self) -> &str {
            "unreachable"
        }

        fn classify(&self, _text: &str) -> Result<SentimentTriple> {
            let timeout = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
            Err(Error::from(timeout))
        }
    }

    #[test]
    fn test_any_classifier_error_becomes_a_skip() {
        let reviews = vec![normalized("fine"), normalized("nice")];
        let (scored, report) = SentimentScorer::new(1).score(&UnreachableClassifier, reviews);

        assert!(scored.is_empty());
        assert_eq!(report.skipped_failed, 2);
        assert_eq!(report.scored, 0);
    }
}
