//! # Text Module
//!
//! Comment normalization and language detection.

mod language;
mod normalizer;

pub use language::{
    Detection, Language, LanguageDetector, LanguageFilter, LanguageReport, StopwordDetector,
};
pub use normalizer::TextNormalizer;
