//! # Sentiment Aggregator
//!
//! Turns per-review probabilities into a satisfaction-over-time signal:
//! calendar-period means, a trailing rolling mean and an overall summary.

use super::classifier::SentimentLabel;
use super::scorer::ScoredReview;
use crate::error::{Error, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Calendar bucket used to group reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    /// ISO week, starting on Monday
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl Period {
    /// First day of the period containing `date`
    pub fn start(&self, date: NaiveDate) -> NaiveDate {
        let start = match self {
            Period::Day => Some(date),
            Period::Week => {
                Some(date - Duration::days(date.weekday().num_days_from_monday() as i64))
            }
            Period::Month => date.with_day(1),
            Period::Quarter => {
                NaiveDate::from_ymd_opt(date.year(), (date.month0() / 3) * 3 + 1, 1)
            }
            Period::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1),
        };
        start.unwrap_or(date)
    }

    /// Display label of the period containing `date`
    pub fn label(&self, date: NaiveDate) -> String {
        match self {
            Period::Day => date.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Month => date.format("%Y-%m").to_string(),
            Period::Quarter => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
            Period::Year => date.year().to_string(),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Quarter => "quarter",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            "quarter" | "quarterly" => Ok(Period::Quarter),
            "year" | "yearly" => Ok(Period::Year),
            other => Err(Error::ConfigError(format!(
                "unknown period '{}', expected day, week, month, quarter or year",
                other
            ))),
        }
    }
}

/// Per-review value averaged into the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationMetric {
    /// Probability of the positive class
    #[default]
    Positive,
    /// Positive minus negative probability
    Composite,
}

impl AggregationMetric {
    /// Metric value for one review
    pub fn value(&self, review: &ScoredReview) -> f64 {
        match self {
            AggregationMetric::Positive => review.prob_positive,
            AggregationMetric::Composite => review.composite(),
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationMetric::Positive => "positive",
            AggregationMetric::Composite => "composite",
        }
    }
}

impl fmt::Display for AggregationMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(AggregationMetric::Positive),
            "composite" => Ok(AggregationMetric::Composite),
            other => Err(Error::ConfigError(format!(
                "unknown metric '{}', expected positive or composite",
                other
            ))),
        }
    }
}

/// Sentiment of one calendar period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodScore {
    /// First day of the period
    pub period_start: NaiveDate,
    /// Display label, e.g. `2023-05`, `2023-W19`, `2023-Q2`
    pub label: String,
    /// Mean of the aggregation metric
    pub score: f64,
    pub mean_negative: f64,
    pub mean_neutral: f64,
    pub mean_positive: f64,
    /// Reviews in the period
    pub review_count: usize,
    /// Standard deviation of the metric within the period
    pub std_dev: f64,
}

/// Trailing mean ending at one review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub score: f64,
}

/// Whole-run sentiment summary
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    /// Mean of the aggregation metric
    pub mean: f64,
    /// Standard deviation of the metric
    pub std_dev: f64,
    pub review_count: usize,
    /// Reviews whose dominant class is negative
    pub negative: usize,
    /// Reviews whose dominant class is neutral
    pub neutral: usize,
    /// Reviews whose dominant class is positive
    pub positive: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Aggregates scored reviews over time
#[derive(Debug, Clone, Default)]
pub struct SentimentAggregator {
    period: Period,
    metric: AggregationMetric,
}

impl SentimentAggregator {
    /// Create an aggregator
    pub fn new(period: Period, metric: AggregationMetric) -> Self {
        Self { period, metric }
    }

    /// Sort reviews by date ascending, keeping input order within a day
    pub fn sort_by_date(reviews: &mut [ScoredReview]) {
        reviews.sort_by_key(|r| r.date);
    }

    /// Mean metric per period, in chronological order
    ///
    /// Periods without reviews are absent from the output.
    pub fn aggregate(&self, reviews: &[ScoredReview]) -> Vec<PeriodScore> {
        let mut buckets: BTreeMap<NaiveDate, Vec<&ScoredReview>> = BTreeMap::new();
        for review in reviews {
            buckets
                .entry(self.period.start(review.date))
                .or_default()
                .push(review);
        }

        buckets
            .into_iter()
            .map(|(start, members)| {
                let count = members.len() as f64;
                let values: Vec<f64> = members.iter().map(|r| self.metric.value(r)).collect();
                let (negative, neutral, positive) =
                    members.iter().fold((0.0, 0.0, 0.0), |acc, r| {
                        (acc.0 + r.prob_negative, acc.1 + r.prob_neutral, acc.2 + r.prob_positive)
                    });

                PeriodScore {
                    period_start: start,
                    label: self.period.label(start),
                    score: values.iter().sum::<f64>() / count,
                    mean_negative: negative / count,
                    mean_neutral: neutral / count,
                    mean_positive: positive / count,
                    review_count: members.len(),
                    std_dev: Self::calculate_std(&values),
                }
            })
            .collect()
    }

    /// Trailing mean of the metric over the last `window` reviews
    ///
    /// Reviews must already be in date order. The first points average
    /// over however many reviews precede them.
    pub fn rolling(&self, reviews: &[ScoredReview], window: usize) -> Vec<RollingPoint> {
        let window = window.max(1);
        let values: Vec<f64> = reviews.iter().map(|r| self.metric.value(r)).collect();

        let mut sum = 0.0;
        reviews
            .iter()
            .enumerate()
            .map(|(i, review)| {
                sum += values[i];
                if i >= window {
                    sum -= values[i - window];
                }
                let len = (i + 1).min(window) as f64;
                RollingPoint {
                    date: review.date,
                    score: sum / len,
                }
            })
            .collect()
    }

    /// Overall mean, spread and dominant-class counts
    pub fn summary(&self, reviews: &[ScoredReview]) -> SentimentSummary {
        if reviews.is_empty() {
            return SentimentSummary::default();
        }

        let values: Vec<f64> = reviews.iter().map(|r| self.metric.value(r)).collect();
        let mut summary = SentimentSummary {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            std_dev: Self::calculate_std(&values),
            review_count: reviews.len(),
            first_date: reviews.iter().map(|r| r.date).min(),
            last_date: reviews.iter().map(|r| r.date).max(),
            ..Default::default()
        };

        for review in reviews {
            match review.dominant() {
                SentimentLabel::Negative => summary.negative += 1,
                SentimentLabel::Neutral => summary.neutral += 1,
                SentimentLabel::Positive => summary.positive += 1,
            }
        }

        summary
    }

    /// Calculate standard deviation
    fn calculate_std(values: &[f64]) -> f64 {
        if values.len() < 2 {
            return 0.0;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64;
        variance.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scored(date: NaiveDate, negative: f64, neutral: f64, positive: f64) -> ScoredReview {
        ScoredReview {
            listing_id: "L1".into(),
            reviewer_name: "Guest".into(),
            date,
            comment: "comment".into(),
            normalized_comment: "comment".into(),
            prob_negative: negative,
            prob_neutral: neutral,
            prob_positive: positive,
        }
    }

    #[test]
    fn test_period_start_and_label() {
        let d = date(2023, 5, 17); // Wednesday
        assert_eq!(Period::Week.start(d), date(2023, 5, 15));
        assert_eq!(Period::Week.label(d), "2023-W20");
        assert_eq!(Period::Month.start(d), date(2023, 5, 1));
        assert_eq!(Period::Month.label(d), "2023-05");
        assert_eq!(Period::Quarter.start(d), date(2023, 4, 1));
        assert_eq!(Period::Quarter.label(d), "2023-Q2");
        assert_eq!(Period::Year.label(d), "2023");
        assert_eq!(Period::Day.label(d), "2023-05-17");
    }

    #[test]
    fn test_iso_week_crosses_year() {
        let d = date(2021, 1, 1); // Friday of 2020-W53
        assert_eq!(Period::Week.label(d), "2020-W53");
        assert_eq!(Period::Week.start(d), date(2020, 12, 28));
    }

    #[test]
    fn test_parse_period_and_metric() {
        assert_eq!("Monthly".parse::<Period>().unwrap(), Period::Month);
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert!("fortnight".parse::<Period>().is_err());
        assert_eq!(
            "composite".parse::<AggregationMetric>().unwrap(),
            AggregationMetric::Composite
        );
    }

    #[test]
    fn test_monthly_aggregation_keeps_gaps() {
        let reviews = vec![
            scored(date(2023, 1, 3), 0.1, 0.1, 0.8),
            scored(date(2023, 1, 20), 0.1, 0.3, 0.6),
            scored(date(2023, 3, 9), 0.7, 0.2, 0.1),
        ];
        let series = SentimentAggregator::new(Period::Month, AggregationMetric::Positive)
            .aggregate(&reviews);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "2023-01");
        assert_eq!(series[0].review_count, 2);
        assert_abs_diff_eq!(series[0].score, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(series[0].std_dev, 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(series[0].mean_neutral, 0.2, epsilon = 1e-12);
        assert_eq!(series[1].label, "2023-03");
        assert_abs_diff_eq!(series[1].score, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_composite_metric() {
        let reviews = vec![scored(date(2023, 1, 3), 0.2, 0.2, 0.6)];
        let series = SentimentAggregator::new(Period::Year, AggregationMetric::Composite)
            .aggregate(&reviews);
        assert_abs_diff_eq!(series[0].score, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let mut reviews = vec![
            scored(date(2023, 2, 1), 0.1, 0.1, 0.8),
            scored(date(2023, 1, 1), 0.2, 0.2, 0.6),
            scored(date(2023, 2, 1), 0.3, 0.3, 0.4),
        ];
        SentimentAggregator::sort_by_date(&mut reviews);
        assert_eq!(reviews[0].date, date(2023, 1, 1));
        assert_abs_diff_eq!(reviews[1].prob_positive, 0.8);
        assert_abs_diff_eq!(reviews[2].prob_positive, 0.4);
    }

    #[test]
    fn test_rolling_mean() {
        let reviews: Vec<ScoredReview> = [0.2, 0.4, 0.6, 0.8]
            .iter()
            .enumerate()
            .map(|(i, p)| scored(date(2023, 1, 1 + i as u32), 1.0 - p, 0.0, *p))
            .collect();
        let rolling = SentimentAggregator::default().rolling(&reviews, 2);

        assert_eq!(rolling.len(), 4);
        assert_abs_diff_eq!(rolling[0].score, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(rolling[1].score, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(rolling[3].score, 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_summary_counts() {
        let reviews = vec![
            scored(date(2023, 1, 1), 0.1, 0.1, 0.8),
            scored(date(2023, 1, 2), 0.8, 0.1, 0.1),
            scored(date(2023, 1, 3), 0.1, 0.8, 0.1),
            scored(date(2023, 1, 4), 0.1, 0.2, 0.7),
        ];
        let summary = SentimentAggregator::default().summary(&reviews);

        assert_eq!(summary.review_count, 4);
        assert_eq!(summary.positive, 2);
        assert_eq!(summary.negative, 1);
        assert_eq!(summary.neutral, 1);
        assert_abs_diff_eq!(summary.mean, 0.425, epsilon = 1e-12);
        assert_eq!(summary.first_date, Some(date(2023, 1, 1)));
    }

    #[test]
    fn test_empty_input() {
        let aggregator = SentimentAggregator::default();
        assert!(aggregator.aggregate(&[]).is_empty());
        assert!(aggregator.rolling(&[], 5).is_empty());
        assert_eq!(aggregator.summary(&[]).review_count, 0);
    }
}
