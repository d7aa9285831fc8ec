//! Review loading and saving utilities
//!
//! Reads a reviews export (CSV or any single-byte-delimited table) into
//! [`RawReview`] rows and writes rows back in the same layout.

use super::review::RawReview;
use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Writer};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns every reviews export must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["listing_id", "reviewer_name", "comments", "date"];

/// Data loader for review exports
#[derive(Debug, Clone)]
pub struct ReviewLoader {
    delimiter: u8,
}

impl Default for ReviewLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Positions of the required columns in the header row
struct ColumnIndex {
    listing_id: usize,
    reviewer_name: usize,
    comments: usize,
    date: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(Error::ParseError(format!(
                "missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let index = |name: &str| {
            find(name)
                .ok_or_else(|| Error::ParseError(format!("missing required column: {}", name)))
        };

        Ok(Self {
            listing_id: index("listing_id")?,
            reviewer_name: index("reviewer_name")?,
            comments: index("comments")?,
            date: index("date")?,
        })
    }
}

impl ReviewLoader {
    /// Create a loader for comma-separated files
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    /// Use a different field delimiter (e.g. `b'\t'`)
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load reviews from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RawReview>> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let reviews = self.load_from_reader(file)?;

        info!(path = %path.display(), rows = reviews.len(), "Loaded reviews");
        Ok(reviews)
    }

    /// Load reviews from any reader
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Vec<RawReview>> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::ParseError(format!("unreadable header row: {}", e)))?
            .clone();
        let columns = ColumnIndex::from_headers(&headers)?;

        let mut reviews = Vec::new();
        for result in reader.records() {
            let record = result.map_err(|e| Error::ParseError(e.to_string()))?;
            reviews.push(Self::parse_record(&record, &columns)?);
        }

        debug!(rows = reviews.len(), "Parsed review records");
        Ok(reviews)
    }

    fn parse_record(record: &StringRecord, columns: &ColumnIndex) -> Result<RawReview> {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let field = |index: usize| record.get(index).map(str::trim).filter(|v| !v.is_empty());

        let listing_id = field(columns.listing_id)
            .ok_or_else(|| Error::ParseError(format!("line {}: empty listing_id", line)))?;

        let raw_date = field(columns.date)
            .ok_or_else(|| Error::ParseError(format!("line {}: empty date", line)))?;
        let date = parse_review_date(raw_date).ok_or_else(|| {
            Error::ParseError(format!("line {}: unrecognised date '{}'", line, raw_date))
        })?;

        Ok(RawReview {
            listing_id: listing_id.to_string(),
            reviewer_name: field(columns.reviewer_name).map(String::from),
            comment: record
                .get(columns.comments)
                .filter(|v| !v.trim().is_empty())
                .map(String::from),
            date,
        })
    }

    /// Save reviews to a CSV file in the export layout
    pub fn save<P: AsRef<Path>>(&self, reviews: &[RawReview], path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = Writer::from_writer(file);

        for review in reviews {
            writer.serialize(review)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Parse a review date
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, RFC 3339 and `MM/DD/YYYY`.
pub fn parse_review_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.date_naive());
    }
    NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "\
listing_id,id,date,reviewer_id,reviewer_name,comments
2818,1191,2009-03-30,10952,Nicole,Daniel is really cool. The place was nice and clean.
2818,1771,2009-04-24,12798,Alice,\"Great location, <br/>very quiet\"
3209,4211,2009-05-02,3333,,Nice host
";

    #[test]
    fn test_load_from_reader() {
        let reviews = ReviewLoader::new().load_from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].listing_id, "2818");
        assert_eq!(reviews[0].reviewer_name.as_deref(), Some("Nicole"));
        assert_eq!(reviews[1].comment.as_deref(), Some("Great location, <br/>very quiet"));
        assert_eq!(reviews[2].reviewer_name, None);
        assert_eq!(reviews[2].date, NaiveDate::from_ymd_opt(2009, 5, 2).unwrap());
    }

    #[test]
    fn test_missing_columns_are_all_reported() {
        let data = "listing_id,date\n1,2020-01-01\n";
        let err = ReviewLoader::new().load_from_reader(data.as_bytes()).unwrap_err();

        match err {
            Error::ParseError(msg) => {
                assert!(msg.contains("reviewer_name"));
                assert!(msg.contains("comments"));
            }
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let data = "listing_id,reviewer_name,comments,date\n1,Bo,Fine,yesterday\n";
        let err = ReviewLoader::new().load_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::ParseError(msg) if msg.contains("yesterday")));
    }

    #[test]
    fn test_tab_delimiter() {
        let data = "listing_id\treviewer_name\tcomments\tdate\nL1\tBo\tFine stay\t2021-07-01\n";
        let reviews = ReviewLoader::new()
            .with_delimiter(b'\t')
            .load_from_reader(data.as_bytes())
            .unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].comment.as_deref(), Some("Fine stay"));
    }

    #[test]
    fn test_parse_review_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2022, 8, 9).unwrap();
        assert_eq!(parse_review_date("2022-08-09"), Some(expected));
        assert_eq!(parse_review_date("2022-08-09 14:30:00"), Some(expected));
        assert_eq!(parse_review_date("2022-08-09T14:30:00+02:00"), Some(expected));
        assert_eq!(parse_review_date("08/09/2022"), Some(expected));
        assert_eq!(parse_review_date("9 Aug"), None);
    }

    #[test]
    fn test_save_and_load_reviews() {
        let date = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        let reviews = vec![
            RawReview::new("L1", Some("Ana"), Some("Cosy, clean room"), date),
            RawReview::new("L1", None, Some("No name given"), date),
        ];

        let dir = tempdir().unwrap();
        let path = dir.path().join("reviews.csv");

        let loader = ReviewLoader::new();
        loader.save(&reviews, &path).unwrap();
        let loaded = loader.load(&path).unwrap();

        assert_eq!(loaded, reviews);
    }
}
