//! Benchmark runner
//!
//! - [`Runner`]: drives a [`Fetcher`] over every (URL, run index) pair
//! - [`scheduler`]: sequential and parallel strategies
//! - [`manager`]: the `run` command around the runner

pub mod manager;
pub mod scheduler;

pub use manager::BenchManager;

use crate::config::{ConcurrencyMode, RunConfig};
use crate::fetcher::{FetchError, Fetcher};
use crate::results::{FetchOutcome, ResultsTable};
use crate::stats::UrlSummary;

use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Runs the configured fetches and assembles the results table
pub struct Runner<F: Fetcher> {
    fetcher: Arc<F>,
    config: RunConfig,
}

impl<F: Fetcher> Runner<F> {
    pub fn new(fetcher: F, config: RunConfig) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            config,
        }
    }

    /// Fetch every URL `run_count` times and collect the outcomes.
    ///
    /// Individual fetch failures are recorded, never returned.
    pub async fn run(&self) -> ResultsTable {
        let config = &self.config;
        info!(
            "Fetching {} URLs x {} runs ({})",
            config.urls.len(),
            config.run_count,
            config.concurrency_mode.label()
        );
        let mut on_column =
            |url: &str, column: &[FetchOutcome]| self.column_finished(url, column);
        match config.concurrency_mode {
            ConcurrencyMode::Sequential => scheduler::run_sequential(self, &mut on_column).await,
            ConcurrencyMode::Parallel => scheduler::run_parallel(self, &mut on_column).await,
        }
    }

    fn run_count(&self) -> usize {
        self.config.run_count as usize
    }

    /// Worker that owns everything needed to fetch one URL's column
    fn worker(&self, url: &str) -> UrlWorker<F> {
        UrlWorker {
            fetcher: Arc::clone(&self.fetcher),
            url: url.to_string(),
            run_count: self.run_count(),
            timeout: self.config.timeout,
        }
    }

    /// Called once per URL when its column is complete
    fn column_finished(&self, url: &str, column: &[FetchOutcome]) {
        let summary = UrlSummary::from_column(url, column);
        if self.config.output.verbose {
            println!("{}", summary.render_run_summary());
        }
        debug!(
            "Finished {}: {}/{} fetches successful",
            url, summary.successful, summary.runs
        );
    }
}

/// Fetches one URL `run_count` times, strictly in run order
pub(crate) struct UrlWorker<F: Fetcher> {
    fetcher: Arc<F>,
    url: String,
    run_count: usize,
    timeout: Duration,
}

impl<F: Fetcher> UrlWorker<F> {
    pub(crate) async fn run(self) -> Vec<FetchOutcome> {
        let mut column = Vec::with_capacity(self.run_count);
        for run_index in 0..self.run_count {
            column.push(self.fetch_once(run_index).await);
        }
        column
    }

    async fn fetch_once(&self, run_index: usize) -> FetchOutcome {
        let result = match timeout(self.timeout, self.fetcher.fetch(&self.url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        match result {
            Ok(response) if response.is_success() => {
                debug!(
                    "{} run {}: {:?}",
                    self.url, run_index, response.elapsed
                );
                FetchOutcome::success(response.elapsed.as_secs_f64())
            }
            Ok(response) => {
                warn!(
                    "{} run {}: HTTP status {}",
                    self.url, run_index, response.status
                );
                FetchOutcome::Failure
            }
            Err(e) => {
                warn!("{} run {}: {}", self.url, run_index, e);
                FetchOutcome::Failure
            }
        }
    }
}
