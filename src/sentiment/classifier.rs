//! # Sentiment Classifier Contract
//!
//! Sentiment inference is delegated to a pretrained model. The pipeline only
//! depends on this narrow capability: text in, a probability distribution
//! over negative/neutral/positive out.

use crate::defaults;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The three sentiment classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Negative,
    Neutral,
    Positive,
}

impl SentimentLabel {
    /// All labels in model output order
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Positive,
    ];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Positive => "positive",
        }
    }

    /// Parse a label as emitted by common sentiment models
    ///
    /// Accepts the label names, their short forms and the positional
    /// `LABEL_0`/`LABEL_1`/`LABEL_2` names.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "negative" | "neg" | "label_0" => Some(SentimentLabel::Negative),
            "neutral" | "neu" | "label_1" => Some(SentimentLabel::Neutral),
            "positive" | "pos" | "label_2" => Some(SentimentLabel::Positive),
            _ => None,
        }
    }
}

/// Probability distribution over the three sentiment classes
///
/// Every constructed triple has non-negative components that sum to one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentTriple {
    pub negative: f64,
    pub neutral: f64,
    pub positive: f64,
}

impl SentimentTriple {
    /// Build from class scores, renormalizing to sum to one
    ///
    /// Fails on negative, non-finite or all-zero scores.
    pub fn from_scores(negative: f64, neutral: f64, positive: f64) -> Result<Self> {
        let scores = [negative, neutral, positive];
        if scores.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(Error::ClassifierError(format!(
                "invalid class scores {:?}",
                scores
            )));
        }

        let total: f64 = scores.iter().sum();
        if total <= 0.0 {
            return Err(Error::ClassifierError("class scores sum to zero".to_string()));
        }

        Ok(Self {
            negative: negative / total,
            neutral: neutral / total,
            positive: positive / total,
        })
    }

    /// Build from raw logits with a softmax
    pub fn from_logits(logits: [f64; 3]) -> Result<Self> {
        if logits.iter().any(|l| !l.is_finite()) {
            return Err(Error::ClassifierError(format!("invalid logits {:?}", logits)));
        }

        let max = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exp: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();
        Self::from_scores(exp[0], exp[1], exp[2])
    }

    /// Probability of a class
    pub fn probability(&self, label: SentimentLabel) -> f64 {
        match label {
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
        }
    }

    /// Most probable class (ties resolve towards neutral, then positive)
    pub fn dominant(&self) -> SentimentLabel {
        if self.neutral >= self.positive && self.neutral >= self.negative {
            SentimentLabel::Neutral
        } else if self.positive >= self.negative {
            SentimentLabel::Positive
        } else {
            SentimentLabel::Negative
        }
    }

    /// Composite polarity: positive minus negative, in [-1, 1]
    pub fn composite(&self) -> f64 {
        self.positive - self.negative
    }

    /// Whether the triple is a valid distribution within tolerance
    pub fn is_valid(&self) -> bool {
        let values = [self.negative, self.neutral, self.positive];
        values.iter().all(|v| (0.0..=1.0).contains(v))
            && (values.iter().sum::<f64>() - 1.0).abs() <= defaults::PROBABILITY_TOLERANCE
    }
}

/// A pretrained three-class sentiment classifier
///
/// Implementations must be deterministic for a given input and always return
/// a valid [`SentimentTriple`].
pub trait SentimentClassifier {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Longest input, in whitespace tokens, the model accepts
    fn max_input_tokens(&self) -> usize {
        defaults::MAX_INPUT_TOKENS
    }

    /// Classify a single text
    fn classify(&self, text: &str) -> Result<SentimentTriple>;

    /// Classify several texts; one result per input, in order
    fn classify_batch(&self, texts: &[&str]) -> Vec<Result<SentimentTriple>> {
        texts.iter().map(|text| self.classify(text)).collect()
    }
}
