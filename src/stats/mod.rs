//! Summary statistics over fetch times
//!
//! - [`Stats`]: aggregate numbers over successful fetch times
//! - [`UrlSummary`] / [`TableSummary`]: per-URL success rate plus stats
//! - Text and JSON reporting

pub mod reporting;

use crate::results::{FetchOutcome, ResultsTable, successful_times};
use serde::{Deserialize, Serialize};

/// Aggregates over the successful fetch times of one URL
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divisor = count)
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
}

impl Stats {
    /// Summarize successful times; `None` when there are none
    pub fn summarize(times: &[f64]) -> Option<Self> {
        if times.is_empty() {
            return None;
        }

        let count = times.len();
        let sum: f64 = times.iter().sum();
        let mean = sum / count as f64;
        let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / count as f64;

        let mut sorted = times.to_vec();
        sorted.sort_by(f64::total_cmp);
        let middle = count / 2;
        let median = if count % 2 == 0 {
            (sorted[middle - 1] + sorted[middle]) / 2.0
        } else {
            sorted[middle]
        };

        Some(Self {
            count,
            sum,
            mean,
            median,
            stddev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
        })
    }
}

/// Success rate of a column in percent (0.0 to 100.0)
pub fn success_rate(column: &[FetchOutcome]) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    let successful = column.iter().filter(|o| o.is_success()).count();
    successful as f64 / column.len() as f64 * 100.0
}

/// Per-URL report entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSummary {
    pub url: String,
    pub runs: usize,
    pub successful: usize,
    pub success_rate: f64,
    /// Absent when no fetch succeeded
    pub stats: Option<Stats>,
}

impl UrlSummary {
    pub fn from_column(url: &str, column: &[FetchOutcome]) -> Self {
        let times = successful_times(column);
        Self {
            url: url.to_string(),
            runs: column.len(),
            successful: times.len(),
            success_rate: success_rate(column),
            stats: Stats::summarize(&times),
        }
    }
}

/// Report over a whole results table, columns in table order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub run_count: usize,
    pub urls: Vec<UrlSummary>,
}

impl TableSummary {
    pub fn from_table(table: &ResultsTable) -> Self {
        Self {
            run_count: table.run_count(),
            urls: table
                .iter()
                .map(|(url, column)| UrlSummary::from_column(url, column))
                .collect(),
        }
    }
}
