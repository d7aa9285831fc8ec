//! # Synthetic Reviews
//!
//! Seeded generator for review tables that look like a real export: several
//! listings, a sentiment trend over time, comments in other languages,
//! HTML/URL noise and rows with missing fields.

use super::review::RawReview;
use chrono::{Duration, NaiveDate};
use rand::prelude::*;

const POSITIVE: &[&str] = &[
    "Great stay, very clean!",
    "Wonderful host and a spotless apartment. Would definitely come back.",
    "Lovely place in a perfect location, close to everything.",
    "<b>Amazing</b> view and super comfortable bed!",
    "Highly recommend, check-in was easy and the host was very helpful.",
    "Cozy flat, exactly as described. See photos at https://example.com/photos",
];

const NEUTRAL: &[&str] = &[
    "It was okay.",
    "The apartment was fine for a short stay.",
    "Average place, nothing special but it did the job.",
    "Check-in was at the time we agreed on.",
];

const NEGATIVE: &[&str] = &[
    "Terrible, dirty room.",
    "The place was noisy and the bathroom was not clean.",
    "Host was rude and unhelpful, would not stay again.",
    "Broken shower, smelly carpet and the wifi never worked.<br/>Disappointing.",
];

const FOREIGN: &[&str] = &[
    "Appartement très propre et bien situé, je recommande!",
    "El piso estaba muy limpio y la ubicación es perfecta.",
    "Die Wohnung war sehr sauber und die Lage ist super.",
    "Casa molto pulita, la posizione è ottima e il proprietario gentile.",
];

const NAMES: &[&str] = &[
    "Alice", "Bruno", "Chen", "Dana", "Emeka", "Farah", "Giulia", "Hiro", "Ines", "Jonas",
];

/// Seeded synthetic review generator
pub struct SyntheticReviews {
    /// Random number generator
    rng: StdRng,
    /// First possible review date
    start: NaiveDate,
    /// Number of days reviews are spread over
    span_days: i64,
    /// Share of comments written in another language
    foreign_rate: f64,
    /// Share of rows missing the comment or reviewer name
    missing_rate: f64,
}

impl Default for SyntheticReviews {
    fn default() -> Self {
        Self::new(42)
    }
}

impl SyntheticReviews {
    /// Create a generator; the same seed always yields the same table
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            start: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            span_days: 180,
            foreign_rate: 0.1,
            missing_rate: 0.05,
        }
    }

    /// Set the first review date and the number of days covered
    pub fn with_period(mut self, start: NaiveDate, span_days: i64) -> Self {
        self.start = start;
        self.span_days = span_days.max(1);
        self
    }

    /// Set the share of non-English comments
    pub fn with_foreign_rate(mut self, rate: f64) -> Self {
        self.foreign_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Set the share of rows with a missing field
    pub fn with_missing_rate(mut self, rate: f64) -> Self {
        self.missing_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Generate reviews for one listing
    ///
    /// Guest satisfaction improves over the covered period: early reviews
    /// lean negative, late ones positive.
    pub fn listing(&mut self, listing_id: &str, count: usize) -> Vec<RawReview> {
        let mut reviews: Vec<RawReview> = (0..count)
            .map(|_| {
                let offset = self.rng.gen_range(0..self.span_days);
                let progress = offset as f64 / self.span_days as f64;
                let date = self.start + Duration::days(offset);

                let comment = self.comment(progress);
                let name = NAMES.choose(&mut self.rng).copied().unwrap_or("Guest");

                let mut review = RawReview::new(listing_id, Some(name), Some(comment), date);
                if self.rng.gen_bool(self.missing_rate) {
                    if self.rng.gen_bool(0.5) {
                        review.comment = None;
                    } else {
                        review.reviewer_name = None;
                    }
                }
                review
            })
            .collect();

        reviews.sort_by_key(|r| r.date);
        reviews
    }

    /// Generate a multi-listing table
    pub fn dataset(&mut self, listings: &[(&str, usize)]) -> Vec<RawReview> {
        listings
            .iter()
            .flat_map(|(id, count)| self.listing(id, *count))
            .collect()
    }

    fn comment(&mut self, progress: f64) -> &'static str {
        if self.rng.gen_bool(self.foreign_rate) {
            return pick(&mut self.rng, FOREIGN);
        }

        let positive_share = 0.15 + 0.7 * progress;
        let roll: f64 = self.rng.gen_range(0.0..1.0);
        if roll < positive_share {
            pick(&mut self.rng, POSITIVE)
        } else if roll < positive_share + 0.15 {
            pick(&mut self.rng, NEUTRAL)
        } else {
            pick(&mut self.rng, NEGATIVE)
        }
    }
}

fn pick(rng: &mut StdRng, pool: &[&'static str]) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_table() {
        let a = SyntheticReviews::new(9).dataset(&[("L1", 30), ("L2", 10)]);
        let b = SyntheticReviews::new(9).dataset(&[("L1", 30), ("L2", 10)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_dates_within_period() {
        let start = NaiveDate::from_ymd_opt(2022, 3, 1).unwrap();
        let reviews = SyntheticReviews::new(1)
            .with_period(start, 90)
            .listing("L1", 200);

        assert!(reviews.iter().all(|r| r.date >= start));
        assert!(reviews.iter().all(|r| r.date < start + Duration::days(90)));
        assert!(reviews.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_missing_rate_zero_keeps_all_fields() {
        let reviews = SyntheticReviews::new(3)
            .with_missing_rate(0.0)
            .with_foreign_rate(0.0)
            .listing("L1", 100);

        assert!(reviews.iter().all(|r| r.comment.is_some() && r.reviewer_name.is_some()));
        assert!(reviews
            .iter()
            .all(|r| !FOREIGN.iter().any(|f| Some(*f) == r.comment.as_deref())));
    }
}
