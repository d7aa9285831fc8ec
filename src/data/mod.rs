//! # Data Module
//!
//! Review records and the table-level stages: loading, cleaning and listing
//! selection, plus a seeded synthetic review generator.

mod cleaner;
mod loader;
mod review;
mod selector;
mod synthetic;

pub use cleaner::{CleanReport, ReviewCleaner};
pub use loader::{parse_review_date, ReviewLoader, REQUIRED_COLUMNS};
pub use review::{NormalizedReview, RawReview, Review};
pub use selector::{ListingCount, ListingSelector, Selection, SelectionPolicy};
pub use synthetic::SyntheticReviews;
