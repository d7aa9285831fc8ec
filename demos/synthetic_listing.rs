//! Synthetic listing walkthrough
//!
//! Generates a seeded review table, writes it to a temporary CSV and runs
//! every stage on it, printing what each one keeps.
//!
//! ```bash
//! cargo run --example synthetic_listing
//! ```

use anyhow::Result;
use review_sentiment::{
    logging, AggregationMetric, ListingSelector, Period, PipelineConfig, ReviewCleaner,
    ReviewLoader, ReviewPipeline, SyntheticReviews,
};

fn main() -> Result<()> {
    logging::setup_logging("warn")?;

    println!("=== Synthetic Listing Demo ===\n");

    let raw = SyntheticReviews::new(2024)
        .with_foreign_rate(0.15)
        .with_missing_rate(0.08)
        .dataset(&[("31094", 90), ("42117", 45), ("58230", 8)]);

    let dir = std::env::temp_dir().join("review_sentiment_demo");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("reviews.csv");
    ReviewLoader::new().save(&raw, &path)?;
    println!("Wrote {} rows to {}\n", raw.len(), path.display());

    let (reviews, cleaning) = ReviewCleaner::new().clean(ReviewLoader::new().load(&path)?);
    println!(
        "Cleaning: kept {}, removed {} ({} without comment, {} without reviewer)",
        cleaning.kept, cleaning.removed, cleaning.missing_comment, cleaning.missing_reviewer
    );

    println!("\nReviews per listing:");
    for count in ListingSelector::listing_counts(&reviews) {
        println!("  {:<8} {:>4}", count.listing_id, count.reviews);
    }

    let mut config = PipelineConfig::default();
    config.aggregation.period = Period::Month;
    config.aggregation.metric = AggregationMetric::Composite;

    let output = ReviewPipeline::from_config(config)?.run_path(&path)?;

    println!("\n{}\n", output.report);
    println!("Monthly composite sentiment for listing {}:", output.listing_id);
    for point in &output.series {
        let width = ((point.score + 1.0) * 20.0).round().max(0.0) as usize;
        println!(
            "  {}  {:>+6.3}  {:<40}  ({} reviews)",
            point.label,
            point.score,
            "#".repeat(width),
            point.review_count
        );
    }

    let summary = &output.summary;
    println!(
        "\nOverall: {:+.3}  ({} positive / {} neutral / {} negative)",
        summary.mean, summary.positive, summary.neutral, summary.negative
    );

    Ok(())
}
