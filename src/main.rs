//! Review sentiment CLI
//!
//! Usage:
//! ```bash
//! cargo run -- --help
//! cargo run -- run reviews.csv --period week --series-csv series.csv
//! cargo run -- listings reviews.csv
//! cargo run -- classify "Lovely flat, very clean"
//! cargo run -- demo
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use review_sentiment::{
    config::{ClassifierBackend, SelectionStrategy},
    data::ListingCount,
    load_config, logging, save_config, write_scored_csv, write_series_csv, write_series_json,
    AggregationMetric, ListingSelector, Period, PipelineConfig, PipelineOutput, ReviewCleaner,
    ReviewLoader, ReviewPipeline, SentimentClassifier, SyntheticReviews, TextNormalizer,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "review_sentiment")]
#[command(version)]
#[command(about = "Guest satisfaction trends from listing reviews", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON, TOML or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the configuration file)
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a reviews file
    Run {
        /// Reviews CSV (listing_id, reviewer_name, comments, date)
        input: PathBuf,

        /// Minimum reviews for a listing to qualify
        #[arg(long)]
        min_reviews: Option<usize>,

        /// Analyse this listing instead of drawing one
        #[arg(long)]
        listing: Option<String>,

        /// Pick the listing with the most reviews
        #[arg(long, conflicts_with = "listing")]
        most_reviewed: bool,

        /// Seed for the listing draw
        #[arg(long)]
        seed: Option<u64>,

        /// Aggregation period (day, week, month, quarter, year)
        #[arg(short, long)]
        period: Option<Period>,

        /// Aggregation metric (positive, composite)
        #[arg(short, long)]
        metric: Option<AggregationMetric>,

        /// Use the hosted inference API instead of the offline lexicon
        #[arg(long)]
        remote: bool,

        /// Write the period series as CSV
        #[arg(long)]
        series_csv: Option<PathBuf>,

        /// Write scored reviews as CSV
        #[arg(long)]
        scored_csv: Option<PathBuf>,

        /// Write series, rolling mean and summary as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show review counts per listing
    Listings {
        /// Reviews CSV
        input: PathBuf,

        /// Minimum reviews for a listing to qualify
        #[arg(long)]
        min_reviews: Option<usize>,

        /// Number of listings to show
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },

    /// Normalize a comment
    Normalize {
        /// Comment text
        text: String,

        /// Lowercase the result
        #[arg(long)]
        lowercase: bool,
    },

    /// Normalize and classify a comment
    Classify {
        /// Comment text
        text: String,

        /// Use the hosted inference API instead of the offline lexicon
        #[arg(long)]
        remote: bool,
    },

    /// Run the pipeline over a seeded synthetic dataset
    Demo {
        /// Random seed for the generated reviews
        #[arg(short, long, default_value = "7")]
        seed: u64,

        /// Also write the generated reviews to this CSV file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path; the extension selects the format
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    logging::setup_logging(&config.logging.level)?;

    match cli.command {
        Commands::Run {
            input,
            min_reviews,
            listing,
            most_reviewed,
            seed,
            period,
            metric,
            remote,
            series_csv,
            scored_csv,
            json,
        } => {
            if let Some(min_reviews) = min_reviews {
                config.selection.min_reviews = min_reviews;
            }
            if let Some(seed) = seed {
                config.selection.strategy = SelectionStrategy::Seeded;
                config.selection.seed = seed;
            }
            if most_reviewed {
                config.selection.strategy = SelectionStrategy::MostReviewed;
            }
            if let Some(listing) = listing {
                config.selection.strategy = SelectionStrategy::Fixed;
                config.selection.listing_id = Some(listing);
            }
            if let Some(period) = period {
                config.aggregation.period = period;
            }
            if let Some(metric) = metric {
                config.aggregation.metric = metric;
            }
            if remote {
                config.classifier.backend = ClassifierBackend::InferenceApi;
            }

            let pipeline = ReviewPipeline::from_config(config)?;
            let output = pipeline
                .run_path(&input)
                .with_context(|| format!("Pipeline failed for {}", input.display()))?;

            print_output(&output, &pipeline);
            export(&output, series_csv.as_deref(), scored_csv.as_deref(), json.as_deref())?;
        }
        Commands::Listings {
            input,
            min_reviews,
            top,
        } => {
            if let Some(min_reviews) = min_reviews {
                config.selection.min_reviews = min_reviews;
            }
            run_listings(&config, &input, top)?;
        }
        Commands::Normalize { text, lowercase } => {
            let normalizer = TextNormalizer::new().with_lowercase(lowercase);
            println!("{}", normalizer.normalize(&text));
        }
        Commands::Classify { text, remote } => {
            if remote {
                config.classifier.backend = ClassifierBackend::InferenceApi;
            }
            run_classify(config, &text)?;
        }
        Commands::Demo { seed, save } => {
            run_demo(config, seed, save.as_deref())?;
        }
        Commands::InitConfig { path } => {
            save_config(&config, &path)
                .with_context(|| format!("Failed to write config to {}", path.display()))?;
            println!("Wrote configuration to {}", path.display());
        }
    }

    Ok(())
}

fn print_output(output: &PipelineOutput, pipeline: &ReviewPipeline) {
    let aggregation = &pipeline.config().aggregation;

    println!("\n=== Review Sentiment: listing {} ===\n", output.listing_id);
    println!("{}\n", output.report);
    println!(
        "Classifier: {}  |  period: {}  |  metric: {}\n",
        pipeline.classifier_name(),
        aggregation.period,
        aggregation.metric
    );

    if output.series.is_empty() {
        println!("No reviews left to score.");
        return;
    }

    println!(
        "{:<12} {:>8} {:>8} {:>9} {:>9} {:>8}",
        "Period", "Score", "Std", "Negative", "Positive", "Reviews"
    );
    println!("{}", "-".repeat(60));
    for point in &output.series {
        println!(
            "{:<12} {:>8.3} {:>8.3} {:>9.3} {:>9.3} {:>8}",
            point.label,
            point.score,
            point.std_dev,
            point.mean_negative,
            point.mean_positive,
            point.review_count
        );
    }

    let summary = &output.summary;
    println!("\nOverall {}: {:.3} (std {:.3})", aggregation.metric, summary.mean, summary.std_dev);
    println!(
        "Dominant class: {} positive, {} neutral, {} negative",
        summary.positive, summary.neutral, summary.negative
    );
    if let Some(last) = output.rolling.last() {
        println!(
            "Rolling mean over last {} reviews: {:.3} (as of {})",
            aggregation.rolling_window, last.score, last.date
        );
    }
}

fn export(
    output: &PipelineOutput,
    series_csv: Option<&Path>,
    scored_csv: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    if let Some(path) = series_csv {
        write_series_csv(&output.series, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Series written to {}", path.display());
    }
    if let Some(path) = scored_csv {
        write_scored_csv(&output.scored, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Scored reviews written to {}", path.display());
    }
    if let Some(path) = json {
        write_series_json(output, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("JSON written to {}", path.display());
    }
    Ok(())
}

fn run_listings(config: &PipelineConfig, input: &Path, top: usize) -> Result<()> {
    let loader = ReviewLoader::new().with_delimiter(config.delimiter()?);
    let raw = loader
        .load(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let (reviews, report) = ReviewCleaner::new().clean(raw);

    let counts: Vec<ListingCount> = ListingSelector::listing_counts(&reviews);
    let threshold = config.selection.min_reviews;
    let qualifying = counts.iter().filter(|c| c.reviews >= threshold).count();

    println!(
        "\n{} complete reviews across {} listings ({} removed as incomplete)",
        report.kept,
        counts.len(),
        report.removed
    );
    println!("{} listings have at least {} reviews\n", qualifying, threshold);

    println!("{:<20} {:>8} {:>10}", "Listing", "Reviews", "Qualifies");
    println!("{}", "-".repeat(40));
    for count in counts.iter().take(top) {
        let mark = if count.reviews >= threshold { "yes" } else { "no" };
        println!("{:<20} {:>8} {:>10}", count.listing_id, count.reviews, mark);
    }

    Ok(())
}

fn run_classify(config: PipelineConfig, text: &str) -> Result<()> {
    let normalizer = TextNormalizer::new().with_lowercase(config.normalizer.lowercase);
    let normalized = normalizer.normalize(text);
    if normalized.is_empty() {
        anyhow::bail!("Nothing left to classify after normalization");
    }

    let pipeline = ReviewPipeline::from_config(config)?;
    let triple = pipeline
        .classifier()
        .classify(&normalized)
        .context("Classification failed")?;

    println!("\nText:       {}", normalized);
    println!("Classifier: {}", pipeline.classifier_name());
    println!("Negative:   {:.3}", triple.negative);
    println!("Neutral:    {:.3}", triple.neutral);
    println!("Positive:   {:.3}", triple.positive);
    println!("Label:      {}", triple.dominant().as_str());

    Ok(())
}

fn run_demo(mut config: PipelineConfig, seed: u64, save: Option<&Path>) -> Result<()> {
    let mut generator = SyntheticReviews::new(seed);
    let raw = generator.dataset(&[("1001", 60), ("1002", 35), ("1003", 12), ("1004", 4)]);
    info!(rows = raw.len(), "Generated synthetic reviews");

    if let Some(path) = save {
        ReviewLoader::new()
            .save(&raw, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Synthetic reviews written to {}", path.display());
    }

    config.selection.strategy = SelectionStrategy::MostReviewed;
    let pipeline = ReviewPipeline::from_config(config)?;
    let output = pipeline.run(raw).context("Demo pipeline failed")?;
    print_output(&output, &pipeline);

    Ok(())
}
