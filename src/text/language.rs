//! # Language Detection
//!
//! Review exports mix languages. The pipeline keeps one target language
//! (English) and drops everything else, including comments whose language
//! cannot be determined.

use crate::data::Review;
use crate::defaults;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Languages the stop-word detector recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Language {
    English,
    French,
    Spanish,
    German,
    Italian,
    Portuguese,
    Dutch,
    /// A language outside the recognised set, or a non-Latin script
    Other,
}

impl Language {
    /// ISO 639-1 code (`"other"` for [`Language::Other`])
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
            Language::Spanish => "es",
            Language::German => "de",
            Language::Italian => "it",
            Language::Portuguese => "pt",
            Language::Dutch => "nl",
            Language::Other => "other",
        }
    }

    /// Parse an ISO 639-1 code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::English),
            "fr" => Some(Language::French),
            "es" => Some(Language::Spanish),
            "de" => Some(Language::German),
            "it" => Some(Language::Italian),
            "pt" => Some(Language::Portuguese),
            "nl" => Some(Language::Dutch),
            _ => None,
        }
    }
}

/// Result of language detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// A language was identified
    Language(Language),
    /// The text is too short or too ambiguous to classify
    Undetermined,
}

impl Detection {
    /// Language code, or `"undetermined"`
    pub fn code(&self) -> &'static str {
        match self {
            Detection::Language(language) => language.code(),
            Detection::Undetermined => "undetermined",
        }
    }

    /// Whether the detection names the given language
    pub fn is(&self, language: Language) -> bool {
        matches!(self, Detection::Language(l) if *l == language)
    }
}

/// Language detection capability
pub trait LanguageDetector {
    /// Detect the language of a text
    fn detect(&self, text: &str) -> Detection;
}

const ENGLISH: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "is", "was", "were", "are", "be", "been", "it", "its",
    "this", "that", "we", "i", "you", "he", "she", "they", "my", "our", "your", "his", "her",
    "their", "us", "me", "in", "on", "at", "to", "for", "of", "with", "from", "as", "if", "very",
    "so", "not", "would", "will", "had", "has", "have", "did", "again", "there", "here", "all",
    "also", "just", "really", "well", "everything", "nothing", "place", "stay", "stayed", "host",
    "room", "great", "clean", "dirty", "nice", "good", "bad", "terrible", "lovely", "location",
    "apartment", "house", "flat", "recommend", "definitely", "comfortable", "perfect",
    "beautiful", "amazing", "okay", "ok", "fine", "quiet", "noisy", "wonderful", "helpful",
    "friendly", "easy", "close", "thanks", "thank", "check", "bed", "kitchen", "bathroom",
    "view", "neighborhood", "experience", "time", "see", "exactly", "described", "never",
    "rude", "broken", "worked", "average", "special", "job", "agreed",
];

const FRENCH: &[&str] = &[
    "le", "la", "les", "de", "des", "du", "et", "est", "un", "une", "très", "nous", "je", "il",
    "elle", "pour", "avec", "dans", "sur", "pas", "appartement", "propre", "bien", "séjour",
    "merci", "hôte", "était", "logement", "accueil", "recommande", "situé", "agréable", "tout",
    "au", "aux", "en", "qui", "que", "vous", "chambre", "calme",
];

const SPANISH: &[&str] = &[
    "el", "la", "los", "las", "de", "del", "y", "es", "muy", "un", "una", "en", "con", "para",
    "por", "que", "estaba", "piso", "limpio", "limpia", "ubicación", "casa", "todo", "nos",
    "anfitrión", "gracias", "lugar", "recomiendo", "perfecto", "perfecta", "fue", "estancia",
    "habitación",
];

const GERMAN: &[&str] = &[
    "der", "die", "das", "und", "ist", "war", "sehr", "ein", "eine", "wir", "ich", "mit", "für",
    "nicht", "wohnung", "sauber", "lage", "gastgeber", "alles", "auch", "zu", "den", "dem", "es",
    "sie", "super", "schön", "gut", "empfehlen", "zimmer", "auf", "in", "was",
];

const ITALIAN: &[&str] = &[
    "il", "lo", "la", "gli", "le", "di", "e", "è", "molto", "un", "una", "con", "per", "che",
    "casa", "pulita", "pulito", "posizione", "ottima", "ottimo", "proprietario", "gentile",
    "tutto", "siamo", "stato", "appartamento", "consiglio", "grazie", "bella", "della", "nel",
    "in",
];

const PORTUGUESE: &[&str] = &[
    "o", "os", "a", "as", "de", "do", "da", "e", "é", "muito", "um", "uma", "com", "para", "que",
    "casa", "limpo", "limpa", "localização", "anfitrião", "tudo", "foi", "apartamento",
    "obrigado", "recomendo", "ótimo", "ótima",
];

const DUTCH: &[&str] = &[
    "de", "het", "een", "en", "is", "was", "zeer", "heel", "wij", "we", "ik", "met", "voor",
    "niet", "schoon", "locatie", "appartement", "mooi", "fijn", "aanrader", "goed", "alles",
    "ook", "van", "in",
];

/// Vocabulary-based language detector
///
/// Counts how many words of a text belong to each language's vocabulary of
/// function words and common review words. Rules:
/// - text whose letters are mostly outside the Latin script is `Other`
/// - fewer than `min_words` words is `Undetermined`
/// - no vocabulary hits, or a tie for the most hits, is `Undetermined`
/// - otherwise the language with the most hits wins
pub struct StopwordDetector {
    /// Vocabulary per language
    vocabularies: Vec<(Language, HashSet<&'static str>)>,
    /// Minimum number of words needed for a decision
    min_words: usize,
}

impl Default for StopwordDetector {
    fn default() -> Self {
        Self::new(defaults::MIN_DETECTION_WORDS)
    }
}

impl StopwordDetector {
    /// Create a detector requiring at least `min_words` words
    pub fn new(min_words: usize) -> Self {
        let vocabularies = [
            (Language::English, ENGLISH),
            (Language::French, FRENCH),
            (Language::Spanish, SPANISH),
            (Language::German, GERMAN),
            (Language::Italian, ITALIAN),
            (Language::Portuguese, PORTUGUESE),
            (Language::Dutch, DUTCH),
        ]
        .into_iter()
        .map(|(language, words)| (language, words.iter().copied().collect()))
        .collect();

        Self {
            vocabularies,
            min_words: min_words.max(1),
        }
    }

    /// Vocabulary hits per language
    pub fn scores(&self, text: &str) -> Vec<(Language, usize)> {
        let words = tokenize(text);
        self.vocabularies
            .iter()
            .map(|(language, vocabulary)| {
                let hits = words.iter().filter(|w| vocabulary.contains(w.as_str())).count();
                (*language, hits)
            })
            .collect()
    }
}

impl LanguageDetector for StopwordDetector {
    fn detect(&self, text: &str) -> Detection {
        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        let latin = letters.iter().filter(|c| is_latin(**c)).count();
        if !letters.is_empty() && latin * 2 < letters.len() {
            return Detection::Language(Language::Other);
        }

        if tokenize(text).len() < self.min_words {
            return Detection::Undetermined;
        }

        let scores = self.scores(text);
        let best = scores.iter().map(|(_, hits)| *hits).max().unwrap_or(0);
        if best == 0 {
            return Detection::Undetermined;
        }

        let mut leaders = scores.iter().filter(|(_, hits)| *hits == best);
        match (leaders.next(), leaders.next()) {
            (Some((language, _)), None) => Detection::Language(*language),
            _ => Detection::Undetermined,
        }
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn is_latin(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{00C0}'..='\u{024F}').contains(&c)
}

/// Counts produced by [`LanguageFilter::filter`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LanguageReport {
    /// Reviews received
    pub input: usize,
    /// Reviews in the target language
    pub kept: usize,
    /// Reviews detected as another language
    pub dropped_other: usize,
    /// Reviews whose language could not be determined
    pub dropped_undetermined: usize,
    /// Detection results by code
    pub by_language: BTreeMap<String, usize>,
}

/// Keeps reviews written in the target language
#[derive(Debug, Clone)]
pub struct LanguageFilter {
    target: Language,
}

impl Default for LanguageFilter {
    fn default() -> Self {
        Self::new(Language::English)
    }
}

impl LanguageFilter {
    /// Create a filter for a target language
    pub fn new(target: Language) -> Self {
        Self { target }
    }

    /// The language kept by this filter
    pub fn target(&self) -> Language {
        self.target
    }

    /// Keep reviews detected as the target language
    ///
    /// Undetermined detections are dropped. An empty result is not an error.
    pub fn filter<D: LanguageDetector + ?Sized>(
        &self,
        detector: &D,
        reviews: Vec<Review>,
    ) -> (Vec<Review>, LanguageReport) {
        let mut report = LanguageReport {
            input: reviews.len(),
            ..Default::default()
        };
        let mut kept = Vec::with_capacity(reviews.len());

        for review in reviews {
            let detection = detector.detect(&review.comment);
            *report.by_language.entry(detection.code().to_string()).or_insert(0) += 1;

            match detection {
                d if d.is(self.target) => kept.push(review),
                Detection::Undetermined => {
                    debug!(
                        reviewer = %review.reviewer_name,
                        "Dropped review: language undetermined"
                    );
                    report.dropped_undetermined += 1;
                }
                Detection::Language(language) => {
                    debug!(
                        reviewer = %review.reviewer_name,
                        language = language.code(),
                        "Dropped review: other language"
                    );
                    report.dropped_other += 1;
                }
            }
        }

        report.kept = kept.len();
        info!(
            target_language = self.target.code(),
            kept = report.kept,
            other = report.dropped_other,
            undetermined = report.dropped_undetermined,
            "Filtered reviews by language"
        );

        (kept, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn review(comment: &str) -> Review {
        Review {
            listing_id: "L1".into(),
            reviewer_name: "Guest".into(),
            comment: comment.into(),
            date: NaiveDate::from_ymd_opt(2023, 3, 3).unwrap(),
        }
    }

    #[test]
    fn test_detects_english_reviews() {
        let detector = StopwordDetector::default();
        for text in [
            "Great stay, very clean!",
            "Terrible, dirty room.",
            "It was okay.",
            "Check-in was at the time we agreed on.",
            "Cozy flat, exactly as described. See photos at https://example.com/photos",
        ] {
            assert_eq!(detector.detect(text), Detection::Language(Language::English), "{}", text);
        }
    }

    #[test]
    fn test_detects_other_languages() {
        let detector = StopwordDetector::default();
        assert!(detector
            .detect("Appartement très propre et bien situé, je recommande!")
            .is(Language::French));
        assert!(detector
            .detect("El piso estaba muy limpio y la ubicación es perfecta.")
            .is(Language::Spanish));
        assert!(detector
            .detect("Die Wohnung war sehr sauber und die Lage ist super.")
            .is(Language::German));
        assert!(detector
            .detect("Casa molto pulita, la posizione è ottima e il proprietario gentile.")
            .is(Language::Italian));
    }

    #[test]
    fn test_non_latin_script_is_other() {
        let detector = StopwordDetector::default();
        assert_eq!(
            detector.detect("房间很干净，位置也很好，房东非常友好"),
            Detection::Language(Language::Other)
        );
        assert_eq!(
            detector.detect("Отличная квартира, всё чисто"),
            Detection::Language(Language::Other)
        );
    }

    #[test]
    fn test_short_text_is_undetermined() {
        let detector = StopwordDetector::default();
        assert_eq!(detector.detect("Great!"), Detection::Undetermined);
        assert_eq!(detector.detect("Nice place"), Detection::Undetermined);
        assert_eq!(detector.detect(":) :) :)"), Detection::Undetermined);
    }

    #[test]
    fn test_no_hits_or_tie_is_undetermined() {
        let detector = StopwordDetector::default();
        assert_eq!(detector.detect("Xyzzy plugh frobozz"), Detection::Undetermined);
        // "in" and "was" are shared by English, German and Dutch
        assert_eq!(detector.detect("in was qqq"), Detection::Undetermined);
    }

    #[test]
    fn test_filter_keeps_only_english() {
        let reviews = vec![
            review("Great stay, very clean!"),
            review("Appartement très propre et bien situé, je recommande!"),
            review("Top!"),
            review("Terrible, dirty room."),
        ];

        let (kept, report) =
            LanguageFilter::default().filter(&StopwordDetector::default(), reviews);

        let comments: Vec<&str> = kept.iter().map(|r| r.comment.as_str()).collect();
        assert_eq!(comments, vec!["Great stay, very clean!", "Terrible, dirty room."]);
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped_other, 1);
        assert_eq!(report.dropped_undetermined, 1);
        assert_eq!(report.by_language.get("fr"), Some(&1));
        assert_eq!(report.by_language.get("undetermined"), Some(&1));
    }

    #[test]
    fn test_all_non_english_yields_empty() {
        let reviews = vec![
            review("El piso estaba muy limpio y la ubicación es perfecta."),
            review("Die Wohnung war sehr sauber und die Lage ist super."),
        ];
        let (kept, report) =
            LanguageFilter::default().filter(&StopwordDetector::default(), reviews);
        assert!(kept.is_empty());
        assert_eq!(report.input, 2);
        assert_eq!(report.dropped_other, 2);
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(Language::from_code("EN"), Some(Language::English));
        assert_eq!(Language::from_code("xx"), None);
        assert_eq!(Detection::Undetermined.code(), "undetermined");
    }
}
