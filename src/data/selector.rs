//! # Listing Selection
//!
//! Picks the single listing a run analyses. Only listings with at least
//! `min_reviews` reviews qualify; which of them is chosen is decided by an
//! explicit [`SelectionPolicy`] so runs are reproducible.

use super::review::Review;
use crate::defaults;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// How a listing is chosen among the qualifying ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Uniform draw among qualifying listings (ordered by id) from a seeded RNG
    Seeded { seed: u64 },
    /// The qualifying listing with the most reviews; ties go to the smallest id
    MostReviewed,
    /// A specific listing, which must itself qualify
    Fixed(String),
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        SelectionPolicy::Seeded {
            seed: defaults::SELECTION_SEED,
        }
    }
}

/// Number of reviews for one listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingCount {
    pub listing_id: String,
    pub reviews: usize,
}

/// The outcome of listing selection
#[derive(Debug, Clone)]
pub struct Selection {
    /// Chosen listing
    pub listing_id: String,
    /// Reviews the chosen listing has
    pub review_count: usize,
    /// How many listings met the threshold
    pub qualifying_listings: usize,
    /// Reviews belonging to the chosen listing, in input order
    pub reviews: Vec<Review>,
}

/// Listing selector
#[derive(Debug, Clone)]
pub struct ListingSelector {
    min_reviews: usize,
    policy: SelectionPolicy,
}

impl Default for ListingSelector {
    fn default() -> Self {
        Self::new(defaults::MIN_REVIEWS)
    }
}

impl ListingSelector {
    /// Create a selector with the default seeded policy
    pub fn new(min_reviews: usize) -> Self {
        Self {
            min_reviews,
            policy: SelectionPolicy::default(),
        }
    }

    /// Set the selection policy
    pub fn with_policy(mut self, policy: SelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Review counts per listing, most reviewed first (ties by id)
    pub fn listing_counts(reviews: &[Review]) -> Vec<ListingCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for review in reviews {
            *counts.entry(review.listing_id.as_str()).or_insert(0) += 1;
        }

        let mut counts: Vec<ListingCount> = counts
            .into_iter()
            .map(|(id, reviews)| ListingCount {
                listing_id: id.to_string(),
                reviews,
            })
            .collect();
        // Stable sort keeps id order within equal counts
        counts.sort_by(|a, b| b.reviews.cmp(&a.reviews));
        counts
    }

    /// Listings meeting the threshold, ordered by id
    pub fn qualifying(&self, reviews: &[Review]) -> Vec<ListingCount> {
        let mut qualifying: Vec<ListingCount> = Self::listing_counts(reviews)
            .into_iter()
            .filter(|c| c.reviews >= self.min_reviews)
            .collect();
        qualifying.sort_by(|a, b| a.listing_id.cmp(&b.listing_id));
        qualifying
    }

    /// Choose a listing and return its reviews
    pub fn select(&self, reviews: Vec<Review>) -> Result<Selection> {
        let qualifying = self.qualifying(&reviews);

        let chosen = match &self.policy {
            SelectionPolicy::Fixed(listing_id) => self.check_fixed(listing_id, &reviews)?,
            _ if qualifying.is_empty() => return Err(self.no_qualifying_error(&reviews)),
            SelectionPolicy::Seeded { seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                qualifying
                    .choose(&mut rng)
                    .cloned()
                    .ok_or_else(|| self.no_qualifying_error(&reviews))?
            }
            SelectionPolicy::MostReviewed => {
                let mut best = qualifying[0].clone();
                for candidate in &qualifying[1..] {
                    if candidate.reviews > best.reviews {
                        best = candidate.clone();
                    }
                }
                best
            }
        };

        let listing_reviews: Vec<Review> = reviews
            .into_iter()
            .filter(|r| r.listing_id == chosen.listing_id)
            .collect();

        info!(
            listing_id = %chosen.listing_id,
            reviews = chosen.reviews,
            qualifying = qualifying.len(),
            min_reviews = self.min_reviews,
            "Selected listing"
        );

        Ok(Selection {
            listing_id: chosen.listing_id,
            review_count: listing_reviews.len(),
            qualifying_listings: qualifying.len(),
            reviews: listing_reviews,
        })
    }

    fn check_fixed(&self, listing_id: &str, reviews: &[Review]) -> Result<ListingCount> {
        let count = reviews.iter().filter(|r| r.listing_id == listing_id).count();

        if count == 0 {
            return Err(Error::SelectionError(format!(
                "listing '{}' has no reviews in the input",
                listing_id
            )));
        }
        if count < self.min_reviews {
            return Err(Error::SelectionError(format!(
                "listing '{}' has {} reviews, below the minimum of {}; lower min_reviews or pick another listing",
                listing_id, count, self.min_reviews
            )));
        }

        Ok(ListingCount {
            listing_id: listing_id.to_string(),
            reviews: count,
        })
    }

    fn no_qualifying_error(&self, reviews: &[Review]) -> Error {
        match Self::listing_counts(reviews).first() {
            Some(best) => Error::SelectionError(format!(
                "no listing has at least {} reviews (most reviewed is '{}' with {}); lower min_reviews",
                self.min_reviews, best.listing_id, best.reviews
            )),
            None => Error::SelectionError("no reviews left to select a listing from".to_string()),
        }
    }
}
