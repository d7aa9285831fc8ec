//! # Review Lexicon
//!
//! Hospitality sentiment lexicon and an offline classifier built on it. The
//! classifier satisfies the same contract as a hosted pretrained model, so it
//! doubles as the default backend and as a deterministic test double.

use super::classifier::{SentimentClassifier, SentimentTriple};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Scale from lexicon polarity to positive/negative logits
const POLARITY_GAIN: f64 = 4.0;

/// Neutral logit for text with no polarity
const NEUTRAL_BIAS: f64 = 1.5;

/// Hospitality sentiment lexicon
///
/// Contains word-sentiment mappings specific to guest reviews.
pub struct ReviewLexicon {
    /// Word to sentiment score mapping
    words: HashMap<String, f64>,
    /// Negation words
    negations: Vec<String>,
    /// Intensifier words
    intensifiers: HashMap<String, f64>,
}

impl Default for ReviewLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl ReviewLexicon {
    /// Create a new lexicon with default words
    pub fn new() -> Self {
        let mut words = HashMap::new();

        let positive_words = vec![
            ("great", 0.8),
            ("excellent", 0.9),
            ("amazing", 0.9),
            ("wonderful", 0.9),
            ("fantastic", 0.9),
            ("perfect", 0.9),
            ("lovely", 0.8),
            ("beautiful", 0.7),
            ("spotless", 0.8),
            ("clean", 0.6),
            ("tidy", 0.5),
            ("comfortable", 0.6),
            ("cozy", 0.6),
            ("cosy", 0.6),
            ("nice", 0.5),
            ("good", 0.5),
            ("helpful", 0.6),
            ("friendly", 0.6),
            ("welcoming", 0.7),
            ("responsive", 0.5),
            ("quiet", 0.4),
            ("convenient", 0.5),
            ("easy", 0.4),
            ("recommend", 0.7),
            ("love", 0.8),
            ("loved", 0.8),
            ("enjoyed", 0.7),
            ("best", 0.8),
            ("awesome", 0.8),
            ("charming", 0.6),
            ("spacious", 0.5),
            ("gorgeous", 0.8),
            ("superb", 0.9),
            ("pleasant", 0.6),
            ("okay", 0.2),
            ("ok", 0.2),
            ("fine", 0.2),
            ("decent", 0.3),
        ];

        let negative_words = vec![
            ("terrible", -0.9),
            ("awful", -0.9),
            ("horrible", -0.9),
            ("worst", -0.9),
            ("dirty", -0.7),
            ("filthy", -0.9),
            ("smelly", -0.7),
            ("noisy", -0.5),
            ("loud", -0.4),
            ("rude", -0.8),
            ("unhelpful", -0.6),
            ("broken", -0.6),
            ("uncomfortable", -0.6),
            ("cramped", -0.5),
            ("disappointing", -0.7),
            ("disappointed", -0.7),
            ("bad", -0.6),
            ("poor", -0.6),
            ("cold", -0.3),
            ("mold", -0.8),
            ("bugs", -0.8),
            ("cockroaches", -0.9),
            ("scam", -0.9),
            ("cancelled", -0.6),
            ("unsafe", -0.8),
            ("avoid", -0.8),
            ("problem", -0.5),
            ("problems", -0.5),
            ("worn", -0.3),
            ("overpriced", -0.6),
        ];

        for (word, score) in positive_words {
            words.insert(word.to_string(), score);
        }

        for (word, score) in negative_words {
            words.insert(word.to_string(), score);
        }

        let negations = vec![
            "not", "no", "never", "nothing", "none", "cannot", "cant", "don't", "dont", "doesn't",
            "doesnt", "didn't", "didnt", "wasn't", "wasnt", "weren't", "werent", "isn't", "isnt",
            "aren't", "arent", "hardly", "barely",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mut intensifiers = HashMap::new();
        intensifiers.insert("very".to_string(), 1.5);
        intensifiers.insert("extremely".to_string(), 2.0);
        intensifiers.insert("super".to_string(), 1.5);
        intensifiers.insert("really".to_string(), 1.3);
        intensifiers.insert("so".to_string(), 1.3);
        intensifiers.insert("incredibly".to_string(), 1.8);
        intensifiers.insert("absolutely".to_string(), 1.8);
        intensifiers.insert("highly".to_string(), 1.5);
        intensifiers.insert("quite".to_string(), 0.8);
        intensifiers.insert("slightly".to_string(), 0.5);
        intensifiers.insert("somewhat".to_string(), 0.7);
        intensifiers.insert("bit".to_string(), 0.6);

        Self {
            words,
            negations,
            intensifiers,
        }
    }

    /// Get sentiment score for a word
    pub fn get_score(&self, word: &str) -> Option<f64> {
        self.words.get(&word.to_lowercase()).copied()
    }

    /// Check if a word is a negation
    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(&word.to_lowercase())
    }

    /// Get intensifier multiplier
    pub fn get_intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(&word.to_lowercase()).copied()
    }

    /// Calculate sentiment score for a text
    ///
    /// Uses simple rule-based approach:
    /// 1. Look up word scores
    /// 2. Apply negation handling (flip sign for words after negation)
    /// 3. Apply intensifier scaling
    pub fn analyze(&self, text: &str) -> LexiconResult {
        let mut scores: Vec<f64> = Vec::new();
        let mut matched_words: Vec<(String, f64)> = Vec::new();

        let mut negate_next = false;
        let mut intensifier: f64 = 1.0;

        let words = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'').to_lowercase())
            .filter(|w| !w.is_empty());

        for word in words {
            if self.is_negation(&word) {
                negate_next = true;
                continue;
            }

            if let Some(mult) = self.get_intensifier(&word) {
                intensifier = mult;
                continue;
            }

            if let Some(mut score) = self.get_score(&word) {
                if negate_next {
                    score = -score * 0.75;
                    negate_next = false;
                }

                score *= intensifier;
                intensifier = 1.0;

                scores.push(score);
                matched_words.push((word, score));
            } else {
                // Reset modifiers if word not found
                negate_next = false;
                intensifier = 1.0;
            }
        }

        let sentiment_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        LexiconResult {
            score: sentiment_score.clamp(-1.0, 1.0),
            word_count: scores.len(),
            matched_words,
        }
    }
}

/// Result from lexicon-based analysis
#[derive(Debug, Clone)]
pub struct LexiconResult {
    /// Overall sentiment score (-1 to 1)
    pub score: f64,
    /// Words that matched with their scores
    pub matched_words: Vec<(String, f64)>,
    /// Number of sentiment words found
    pub word_count: usize,
}

/// Offline classifier backed by [`ReviewLexicon`]
///
/// Polarity `s` becomes logits `[-g*s, b*(1-|s|), g*s]`, softmaxed into a
/// triple, so text without sentiment words leans neutral.
pub struct LexiconClassifier {
    lexicon: ReviewLexicon,
    max_input_tokens: usize,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    /// Create a classifier with the default lexicon
    pub fn new() -> Self {
        Self::with_lexicon(ReviewLexicon::new())
    }

    /// Create a classifier over a custom lexicon
    pub fn with_lexicon(lexicon: ReviewLexicon) -> Self {
        Self {
            lexicon,
            max_input_tokens: crate::defaults::MAX_INPUT_TOKENS,
        }
    }

    /// Set the maximum input length in tokens
    pub fn with_max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens.max(1);
        self
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn max_input_tokens(&self) -> usize {
        self.max_input_tokens
    }

    fn classify(&self, text: &str) -> Result<SentimentTriple> {
        if text.trim().is_empty() {
            return Err(Error::ClassifierError("empty input".to_string()));
        }

        let polarity = self.lexicon.analyze(text).score;
        SentimentTriple::from_logits([
            -POLARITY_GAIN * polarity,
            NEUTRAL_BIAS * (1.0 - polarity.abs()),
            POLARITY_GAIN * polarity,
        ])
    }
}
