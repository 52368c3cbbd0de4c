//! Bench manager: configuration summary, run, export and final report

use super::Runner;
use crate::config::RunConfig;
use crate::constants::PROGRESS_DOT_INTERVAL_MS;
use crate::errors::{ErrorContext, Result};
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::results::{self, ResultsTable};
use crate::stats::TableSummary;

use std::io::Write;
use std::time::{Duration, Instant};
use tracing::info;

/// Drives one benchmark invocation end to end
pub struct BenchManager {
    config: RunConfig,
}

impl BenchManager {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// Run the benchmark against the real network
    pub async fn run_benchmark(&self) -> Result<()> {
        let fetcher = HttpFetcher::new(&self.config)?;
        self.run_with_fetcher(fetcher).await?;
        Ok(())
    }

    /// Run with the given fetcher, then report and export
    pub async fn run_with_fetcher<F: Fetcher>(&self, fetcher: F) -> Result<TableSummary> {
        let runner = Runner::new(fetcher, self.config.clone());

        let start = Instant::now();
        let table = if self.config.output.verbose {
            runner.run().await
        } else {
            self.run_with_progress_dots(&runner).await
        };
        let run_duration = start.elapsed();
        info!(
            "Benchmark finished in {:.3}s",
            run_duration.as_secs_f64()
        );

        let summary = TableSummary::from_table(&table);
        summary.print_report(Some(run_duration));
        self.write_outputs(&table, &summary)?;

        Ok(summary)
    }

    /// Wait for the run while printing a dot every tick
    async fn run_with_progress_dots<F: Fetcher>(&self, runner: &Runner<F>) -> ResultsTable {
        print!("Progress: ");
        let _ = std::io::stdout().flush();

        let mut dot_interval =
            tokio::time::interval(Duration::from_millis(PROGRESS_DOT_INTERVAL_MS));
        let run = runner.run();
        tokio::pin!(run);

        loop {
            tokio::select! {
                table = &mut run => {
                    println!(); // New line after dots
                    return table;
                }
                _ = dot_interval.tick() => {
                    print!(".");
                    let _ = std::io::stdout().flush();
                }
            }
        }
    }

    fn write_outputs(&self, table: &ResultsTable, summary: &TableSummary) -> Result<()> {
        if let Some(path) = &self.config.output.path {
            results::export(table, path)?;
            info!("Results table written to {}", path.display());
        }

        if let Some(path) = &self.config.output.summary_json {
            std::fs::write(path, summary.to_json_pretty()?).with_io_context(&format!(
                "Cannot write summary to '{}'",
                path.display()
            ))?;
            info!("Summary written to {}", path.display());
        }

        Ok(())
    }
}
