//! Result exports
//!
//! Period series and scored reviews as CSV, and the full satisfaction
//! signal as a JSON document. CSV files always start with a header row,
//! so an empty run still produces a readable table.

use crate::error::Result;
use crate::pipeline::PipelineOutput;
use crate::sentiment::{PeriodScore, RollingPoint, ScoredReview, SentimentSummary};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Columns of the period series CSV, in [`PeriodScore`] field order
pub const SERIES_HEADER: &[&str] = &[
    "period_start",
    "label",
    "score",
    "mean_negative",
    "mean_neutral",
    "mean_positive",
    "review_count",
    "std_dev",
];

/// Columns of the scored reviews CSV, in [`ScoredReview`] field order
pub const SCORED_HEADER: &[&str] = &[
    "listing_id",
    "reviewer_name",
    "date",
    "comment",
    "normalized_comment",
    "prob_negative",
    "prob_neutral",
    "prob_positive",
];

/// Write a header row followed by one row per record
fn write_csv<W: Write, T: Serialize>(header: &[&str], records: &[T], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the period series to a CSV file
pub fn write_series_csv<P: AsRef<Path>>(series: &[PeriodScore], path: P) -> Result<()> {
    write_csv(SERIES_HEADER, series, File::create(path.as_ref())?)?;

    info!(rows = series.len(), path = %path.as_ref().display(), "Wrote period series");
    Ok(())
}

/// Write scored reviews to a CSV file
pub fn write_scored_csv<P: AsRef<Path>>(reviews: &[ScoredReview], path: P) -> Result<()> {
    write_csv(SCORED_HEADER, reviews, File::create(path.as_ref())?)?;

    info!(rows = reviews.len(), path = %path.as_ref().display(), "Wrote scored reviews");
    Ok(())
}

#[derive(Serialize)]
struct SeriesDocument<'a> {
    listing_id: &'a str,
    summary: &'a SentimentSummary,
    series: &'a [PeriodScore],
    rolling: &'a [RollingPoint],
}

impl<'a> SeriesDocument<'a> {
    fn new(output: &'a PipelineOutput) -> Self {
        Self {
            listing_id: &output.listing_id,
            summary: &output.summary,
            series: &output.series,
            rolling: &output.rolling,
        }
    }

    /// Serialize and flush, so a failed final write is reported
    fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        serde_json::to_writer_pretty(&mut out, self)?;
        out.flush()?;
        Ok(())
    }
}

/// Write the satisfaction signal of a run to a JSON file
pub fn write_series_json<P: AsRef<Path>>(output: &PipelineOutput, path: P) -> Result<()> {
    let writer = BufWriter::new(File::create(path.as_ref())?);
    SeriesDocument::new(output).write_to(writer)?;

    info!(path = %path.as_ref().display(), "Wrote series JSON");
    Ok(())
}
