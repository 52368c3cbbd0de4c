//! Results table: one column of fetch outcomes per URL
//!
//! - In-memory table and its builder
//! - CSV export and import
//! - Element-wise fusion of several tables

pub mod export;
pub mod fuse;

pub use export::{export, import};
pub use fuse::fuse;

use crate::errors::{BenchError, Result};
use tracing::warn;

/// Result of one (URL, run index) fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FetchOutcome {
    Success { elapsed_seconds: f64 },
    Failure,
}

impl FetchOutcome {
    pub fn success(elapsed_seconds: f64) -> Self {
        FetchOutcome::Success { elapsed_seconds }
    }

    /// Elapsed seconds for a successful fetch, `None` for a failure
    #[inline]
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match self {
            FetchOutcome::Success { elapsed_seconds } => Some(*elapsed_seconds),
            FetchOutcome::Failure => None,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }
}

/// Read-only matrix of outcomes, columns in URL order and rows in run order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsTable {
    urls: Vec<String>,
    run_count: usize,
    columns: Vec<Vec<FetchOutcome>>,
}

impl ResultsTable {
    /// Assemble a table from complete columns, checking every column has
    /// `run_count` entries
    pub fn from_columns(
        urls: Vec<String>,
        run_count: usize,
        columns: Vec<Vec<FetchOutcome>>,
    ) -> Result<Self> {
        if urls.len() != columns.len() {
            return Err(BenchError::table(format!(
                "{} URLs but {} columns",
                urls.len(),
                columns.len()
            )));
        }
        if let Some((url, column)) = urls
            .iter()
            .zip(&columns)
            .find(|(_, column)| column.len() != run_count)
        {
            return Err(BenchError::table(format!(
                "Column '{}' has {} entries, expected {}",
                url,
                column.len(),
                run_count
            )));
        }
        Ok(Self {
            urls,
            run_count,
            columns,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn run_count(&self) -> usize {
        self.run_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Column for `url`, if it is part of the table
    pub fn column(&self, url: &str) -> Option<&[FetchOutcome]> {
        self.urls
            .iter()
            .position(|u| u == url)
            .map(|index| self.columns[index].as_slice())
    }

    /// `(url, column)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FetchOutcome])> {
        self.urls
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Outcomes of one run index across all URLs, in column order
    pub fn row(&self, run_index: usize) -> impl Iterator<Item = &FetchOutcome> {
        self.columns.iter().filter_map(move |column| column.get(run_index))
    }
}

/// Successful times of a column, failures skipped
pub fn successful_times(column: &[FetchOutcome]) -> Vec<f64> {
    column.iter().filter_map(FetchOutcome::elapsed_seconds).collect()
}

/// Pre-sized table under construction.
///
/// Each URL position owns one slot that is written exactly once with a
/// complete column.
#[derive(Debug)]
pub struct TableBuilder {
    urls: Vec<String>,
    run_count: usize,
    slots: Vec<Option<Vec<FetchOutcome>>>,
}

impl TableBuilder {
    pub fn new(urls: Vec<String>, run_count: usize) -> Self {
        let slots = vec![None; urls.len()];
        Self {
            urls,
            run_count,
            slots,
        }
    }

    /// Store the column of URL position `index`
    pub fn insert(&mut self, index: usize, column: Vec<FetchOutcome>) -> Result<()> {
        let run_count = self.run_count;
        let url = self
            .urls
            .get(index)
            .ok_or_else(|| BenchError::table(format!("No URL at column {}", index)))?;

        if column.len() != run_count {
            return Err(BenchError::table(format!(
                "Column '{}' has {} entries, expected {}",
                url,
                column.len(),
                run_count
            )));
        }

        let slot = &mut self.slots[index];
        if slot.is_some() {
            return Err(BenchError::table(format!(
                "Column '{}' was already written",
                url
            )));
        }
        *slot = Some(column);
        Ok(())
    }

    /// Freeze the table. Slots never written become all-failure columns.
    pub fn finish(self) -> ResultsTable {
        let run_count = self.run_count;
        let columns = self
            .urls
            .iter()
            .zip(self.slots)
            .map(|(url, slot)| {
                slot.unwrap_or_else(|| {
                    warn!("No results collected for {}, recording all runs as failed", url);
                    vec![FetchOutcome::Failure; run_count]
                })
            })
            .collect();

        ResultsTable {
            urls: self.urls,
            run_count,
            columns,
        }
    }
}
