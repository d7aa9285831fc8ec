//! # Review Cleaning
//!
//! Drops rows that cannot be analysed because the comment or the reviewer
//! name is missing. Missing data is expected in review exports, so this stage
//! never fails; it reports what it removed.

use super::review::{RawReview, Review};
use serde::Serialize;
use tracing::{debug, info};

/// Counts produced by [`ReviewCleaner::clean`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    /// Rows received
    pub input: usize,
    /// Rows kept
    pub kept: usize,
    /// Rows dropped (each counted once)
    pub removed: usize,
    /// Rows with a missing or blank comment
    pub missing_comment: usize,
    /// Rows with a missing or blank reviewer name
    pub missing_reviewer: usize,
}

/// Removes incomplete review rows
#[derive(Debug, Clone, Default)]
pub struct ReviewCleaner;

impl ReviewCleaner {
    /// Create a new cleaner
    pub fn new() -> Self {
        Self
    }

    /// Keep only rows with both a comment and a reviewer name
    pub fn clean(&self, raw: Vec<RawReview>) -> (Vec<Review>, CleanReport) {
        let mut report = CleanReport {
            input: raw.len(),
            ..Default::default()
        };
        let mut kept = Vec::with_capacity(raw.len());

        for row in raw {
            let comment_missing = is_blank(row.comment.as_deref());
            let reviewer_missing = is_blank(row.reviewer_name.as_deref());

            if comment_missing {
                report.missing_comment += 1;
            }
            if reviewer_missing {
                report.missing_reviewer += 1;
            }

            match Review::from_raw(row) {
                Some(review) => kept.push(review),
                None => report.removed += 1,
            }
        }

        report.kept = kept.len();

        if report.removed > 0 {
            debug!(
                missing_comment = report.missing_comment,
                missing_reviewer = report.missing_reviewer,
                "Dropped incomplete reviews"
            );
        }
        info!(
            input = report.input,
            kept = report.kept,
            removed = report.removed,
            "Cleaned reviews"
        );

        (kept, report)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(name: Option<&str>, comment: Option<&str>) -> RawReview {
        RawReview::new("L1", name, comment, NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
    }

    #[test]
    fn test_removes_exactly_incomplete_rows() {
        let rows = vec![
            row(Some("Ana"), Some("Great")),
            row(None, Some("No name")),
            row(Some("Bo"), None),
            row(None, None),
            row(Some("Cy"), Some("  ")),
            row(Some("Di"), Some("Fine")),
        ];

        let (kept, report) = ReviewCleaner::new().clean(rows);

        let names: Vec<&str> = kept.iter().map(|r| r.reviewer_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Di"]);
        assert_eq!(report.input, 6);
        assert_eq!(report.kept, 2);
        assert_eq!(report.removed, 4);
        assert_eq!(report.missing_comment, 3);
        assert_eq!(report.missing_reviewer, 2);
    }

    #[test]
    fn test_complete_input_untouched() {
        let rows = vec![row(Some("Ana"), Some("Great")), row(Some("Bo"), Some("Good"))];
        let (kept, report) = ReviewCleaner::new().clean(rows.clone());

        assert_eq!(kept.len(), rows.len());
        assert_eq!(report.removed, 0);
    }

    #[test]
    fn test_empty_input() {
        let (kept, report) = ReviewCleaner::new().clean(Vec::new());
        assert!(kept.is_empty());
        assert_eq!(report, CleanReport::default());
    }
}
