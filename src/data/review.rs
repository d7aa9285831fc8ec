//! # Review Records
//!
//! The row types that flow through the pipeline. Each stage narrows the type:
//! a `RawReview` may lack fields, a `Review` cannot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A review row exactly as read from the export
///
/// Reviewer name and comment may be absent; everything else is required by
/// the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    /// Listing the review belongs to
    pub listing_id: String,
    /// Display name of the guest
    pub reviewer_name: Option<String>,
    /// Free-text review body
    #[serde(rename = "comments")]
    pub comment: Option<String>,
    /// Date the review was posted
    pub date: NaiveDate,
}

impl RawReview {
    /// Create a raw review
    pub fn new(
        listing_id: impl Into<String>,
        reviewer_name: Option<&str>,
        comment: Option<&str>,
        date: NaiveDate,
    ) -> Self {
        Self {
            listing_id: listing_id.into(),
            reviewer_name: reviewer_name.map(String::from),
            comment: comment.map(String::from),
            date,
        }
    }
}

/// A complete review: reviewer name and comment are present and non-blank
///
/// [`ReviewCleaner`](super::ReviewCleaner) guarantees this for the reviews it
/// returns. The fields are public, so a review constructed directly or
/// deserialized is not checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub listing_id: String,
    pub reviewer_name: String,
    pub comment: String,
    pub date: NaiveDate,
}

impl Review {
    /// Build a review from a raw row, or `None` if a required field is blank
    pub(crate) fn from_raw(raw: RawReview) -> Option<Self> {
        let reviewer_name = non_blank(raw.reviewer_name)?;
        let comment = non_blank(raw.comment)?;

        Some(Self {
            listing_id: raw.listing_id,
            reviewer_name,
            comment,
            date: raw.date,
        })
    }
}

/// A review with its comment normalized for classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub review: Review,
    pub normalized_comment: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
