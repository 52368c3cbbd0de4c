//! Scheduling strategies
//!
//! Both strategies run a URL's fetches in run order inside one worker. They
//! differ only in how workers for different URLs overlap.

use super::Runner;
use crate::fetcher::Fetcher;
use crate::results::{FetchOutcome, ResultsTable, TableBuilder};

use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::error;

/// Called with each URL's column as soon as it is complete
pub type ColumnHook<'a> = dyn FnMut(&str, &[FetchOutcome]) + Send + 'a;

/// One URL at a time: URL i+1 starts only after URL i's last fetch
pub async fn run_sequential<F: Fetcher>(
    runner: &Runner<F>,
    on_column: &mut ColumnHook<'_>,
) -> ResultsTable {
    let urls = &runner.config.urls;
    let mut builder = TableBuilder::new(urls.clone(), runner.run_count());

    for (index, url) in urls.iter().enumerate() {
        let column = runner.worker(url).run().await;
        on_column(url, &column);
        if let Err(e) = builder.insert(index, column) {
            error!("Dropping results for {}: {}", url, e);
        }
    }

    builder.finish()
}

/// One spawned worker per URL, all running concurrently.
///
/// Columns land in the slot of their URL position whatever order the
/// workers finish in. With `max_workers` set, at most that many workers
/// fetch at the same time.
pub async fn run_parallel<F: Fetcher>(
    runner: &Runner<F>,
    on_column: &mut ColumnHook<'_>,
) -> ResultsTable {
    let urls = &runner.config.urls;
    let run_count = runner.run_count();
    let mut builder = TableBuilder::new(urls.clone(), run_count);
    let limit = runner
        .config
        .max_workers
        .map(|n| Arc::new(Semaphore::new(n)));

    let mut pending: FuturesUnordered<_> = urls
        .iter()
        .enumerate()
        .map(|(index, url)| {
            let worker = runner.worker(url);
            let limit = limit.clone();
            let handle = tokio::spawn(async move {
                let _permit = match limit {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                worker.run().await
            });
            async move { (index, handle.await) }
        })
        .collect();

    while let Some((index, joined)) = pending.next().await {
        let url = &urls[index];
        let column = joined.unwrap_or_else(|e| {
            error!("Worker for {} failed: {}", url, e);
            vec![FetchOutcome::Failure; run_count]
        });
        on_column(url, &column);
        if let Err(e) = builder.insert(index, column) {
            error!("Dropping results for {}: {}", url, e);
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Event, ScriptedFetcher, ok_ms, refused, status};
    use super::*;
    use crate::config::ConcurrencyMode;
    use crate::fetcher::Fetcher;
    use crate::config::RunConfig;
    use crate::results::successful_times;
    use crate::stats::{Stats, success_rate};
    use async_trait::async_trait;
    use std::time::Duration;

    fn config(urls: &[&str], runs: u32, mode: ConcurrencyMode) -> RunConfig {
        let mut config = RunConfig::with_urls(urls.iter().map(|u| u.to_string()).collect());
        config.run_count = runs;
        config.concurrency_mode = mode;
        config
    }

    async fn run_with(fetcher: ScriptedFetcher, config: &RunConfig) -> ResultsTable {
        Runner::new(fetcher, config.clone()).run().await
    }

    #[tokio::test]
    async fn test_sequential_scenario() {
        let config = config(&["u1", "u2"], 3, ConcurrencyMode::Sequential);
        let fetcher = ScriptedFetcher::new()
            .script("u1", ok_ms(&[100, 200, 300]))
            .script("u2", refused());

        let table = run_with(fetcher, &config).await;

        assert_eq!(table.run_count(), 3);
        assert_eq!(table.urls(), ["u1", "u2"]);
        let u1 = table.column("u1").unwrap();
        let u2 = table.column("u2").unwrap();
        assert_eq!(successful_times(u1), vec![0.1, 0.2, 0.3]);
        assert_eq!(u2, [FetchOutcome::Failure; 3]);
        assert_eq!(success_rate(u1), 100.0);
        assert_eq!(success_rate(u2), 0.0);
    }

    #[tokio::test]
    async fn test_shape_is_independent_of_outcomes_and_mode() {
        for mode in [ConcurrencyMode::Sequential, ConcurrencyMode::Parallel] {
            let config = config(&["a", "b", "c", "d"], 5, mode);
            let fetcher = ScriptedFetcher::new()
                .script("a", ok_ms(&[10]))
                .script("b", status(500))
                .script("c", refused())
                .script("d", {
                    let mut mixed = ok_ms(&[20]);
                    mixed.extend(status(404));
                    mixed
                });

            let table = run_with(fetcher, &config).await;

            assert_eq!(table.column_count(), 4, "{:?}", mode);
            assert_eq!(table.urls(), ["a", "b", "c", "d"]);
            for (_, column) in table.iter() {
                assert_eq!(column.len(), 5, "{:?}", mode);
            }
            // d alternates success and 404: runs 0, 2, 4 succeed
            let d = table.column("d").unwrap();
            assert_eq!(successful_times(d), vec![0.02, 0.02, 0.02]);
            assert!(!d[1].is_success() && !d[3].is_success());
        }
    }

    #[tokio::test]
    async fn test_sequential_finishes_each_url_before_the_next() {
        let config = config(&["u1", "u2"], 2, ConcurrencyMode::Sequential);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("u1", ok_ms(&[1]))
                .script("u2", ok_ms(&[1])),
        );

        Runner::new(SharedFetcher(Arc::clone(&fetcher)), config)
            .run()
            .await;

        let start = |u: &str, i| Event::Start(u.to_string(), i);
        let end = |u: &str, i| Event::End(u.to_string(), i);
        assert_eq!(
            fetcher.events(),
            vec![
                start("u1", 0),
                end("u1", 0),
                start("u1", 1),
                end("u1", 1),
                start("u2", 0),
                end("u2", 0),
                start("u2", 1),
                end("u2", 1),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_keeps_url_order_when_completion_is_reversed() {
        let config = config(&["slow", "medium", "fast"], 3, ConcurrencyMode::Parallel);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("slow", ok_ms(&[300]))
                .script("medium", ok_ms(&[200]))
                .script("fast", ok_ms(&[100]))
                .delay("slow", Duration::from_secs(3))
                .delay("medium", Duration::from_secs(2))
                .delay("fast", Duration::from_secs(1)),
        );

        let table = Runner::new(SharedFetcher(Arc::clone(&fetcher)), config)
            .run()
            .await;

        assert_eq!(table.urls(), ["slow", "medium", "fast"]);
        assert_eq!(successful_times(table.column("slow").unwrap()), vec![0.3; 3]);
        assert_eq!(successful_times(table.column("medium").unwrap()), vec![0.2; 3]);
        assert_eq!(successful_times(table.column("fast").unwrap()), vec![0.1; 3]);

        // All three URLs were in flight together, and "fast" finished first
        assert_eq!(fetcher.max_in_flight(), 3);
        let ends: Vec<_> = fetcher
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::End(url, 2) => Some(url),
                _ => None,
            })
            .collect();
        assert_eq!(ends, vec!["fast", "medium", "slow"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_runs_each_url_in_order() {
        let config = config(&["u1", "u2"], 4, ConcurrencyMode::Parallel);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("u1", ok_ms(&[1, 2, 3, 4]))
                .script("u2", ok_ms(&[5, 6, 7, 8]))
                .delay("u1", Duration::from_millis(30))
                .delay("u2", Duration::from_millis(70)),
        );

        let table = Runner::new(SharedFetcher(Arc::clone(&fetcher)), config)
            .run()
            .await;

        assert_eq!(
            successful_times(table.column("u1").unwrap()),
            vec![0.001, 0.002, 0.003, 0.004]
        );
        assert_eq!(
            successful_times(table.column("u2").unwrap()),
            vec![0.005, 0.006, 0.007, 0.008]
        );
        for url in ["u1", "u2"] {
            let starts: Vec<_> = fetcher
                .events()
                .into_iter()
                .filter_map(|e| match e {
                    Event::Start(u, i) if u == url => Some(i),
                    _ => None,
                })
                .collect();
            assert_eq!(starts, vec![0, 1, 2, 3]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallel_respects_worker_limit() {
        let mut config = config(&["a", "b", "c"], 2, ConcurrencyMode::Parallel);
        config.max_workers = Some(1);
        let fetcher = Arc::new(
            ScriptedFetcher::new()
                .script("a", ok_ms(&[1]))
                .script("b", ok_ms(&[1]))
                .script("c", ok_ms(&[1]))
                .delay("a", Duration::from_millis(10))
                .delay("b", Duration::from_millis(10))
                .delay("c", Duration::from_millis(10)),
        );

        let table = Runner::new(SharedFetcher(Arc::clone(&fetcher)), config)
            .run()
            .await;

        assert_eq!(table.column_count(), 3);
        assert_eq!(fetcher.max_in_flight(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_fetch_times_out_as_failure() {
        let mut config = config(&["hang", "ok"], 2, ConcurrencyMode::Sequential);
        config.timeout = Duration::from_secs(1);
        let fetcher = ScriptedFetcher::new()
            .script("hang", ok_ms(&[1]))
            .delay("hang", Duration::from_secs(3600))
            .script("ok", ok_ms(&[50]));

        let table = run_with(fetcher, &config).await;

        assert_eq!(table.column("hang").unwrap(), [FetchOutcome::Failure; 2]);
        assert_eq!(successful_times(table.column("ok").unwrap()), vec![0.05, 0.05]);
    }

    #[tokio::test]
    async fn test_parallel_panicking_worker_keeps_other_columns() {
        let config = config(&["u1", "boom", "u3"], 2, ConcurrencyMode::Parallel);
        let fetcher = ScriptedFetcher::new()
            .script("u1", ok_ms(&[10]))
            .script("u3", ok_ms(&[30]))
            .panic_on("boom");

        let table = run_with(fetcher, &config).await;

        assert_eq!(table.urls(), ["u1", "boom", "u3"]);
        assert_eq!(successful_times(table.column("u1").unwrap()), vec![0.01, 0.01]);
        assert_eq!(table.column("boom").unwrap(), [FetchOutcome::Failure; 2]);
        assert_eq!(successful_times(table.column("u3").unwrap()), vec![0.03, 0.03]);
    }

    #[tokio::test]
    async fn test_panicking_worker_column_is_still_reported() {
        let config = config(&["u1", "boom"], 3, ConcurrencyMode::Parallel);
        let fetcher = ScriptedFetcher::new()
            .script("u1", ok_ms(&[10]))
            .panic_on("boom");
        let runner = Runner::new(fetcher, config);

        let mut finished = Vec::new();
        run_parallel(&runner, &mut |url: &str, column: &[FetchOutcome]| {
            finished.push((url.to_string(), column.to_vec()))
        })
        .await;

        finished.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(finished.len(), 2);
        assert_eq!(finished[0], ("boom".to_string(), vec![FetchOutcome::Failure; 3]));
        assert_eq!(finished[1].0, "u1");
    }

    #[tokio::test]
    async fn test_sequential_reports_columns_in_url_order() {
        let config = config(&["u1", "u2"], 1, ConcurrencyMode::Sequential);
        let fetcher = ScriptedFetcher::new()
            .script("u1", ok_ms(&[1]))
            .script("u2", refused());
        let runner = Runner::new(fetcher, config);

        let mut finished = Vec::new();
        run_sequential(&runner, &mut |url: &str, column: &[FetchOutcome]| {
            finished.push((url.to_string(), column[0].is_success()))
        })
        .await;

        assert_eq!(
            finished,
            vec![("u1".to_string(), true), ("u2".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_constant_fetch_time_gives_flat_stats() {
        let config = config(&["u1"], 8, ConcurrencyMode::Parallel);
        let fetcher = ScriptedFetcher::new().script("u1", ok_ms(&[250]));

        let table = run_with(fetcher, &config).await;
        let stats = Stats::summarize(&successful_times(table.column("u1").unwrap())).unwrap();

        assert_eq!(stats.count, 8);
        assert!((stats.mean - 0.25).abs() < 1e-12);
        assert_eq!(stats.median, 0.25);
        assert!(stats.stddev.abs() < 1e-12);
        assert_eq!(stats.min, 0.25);
        assert_eq!(stats.max, 0.25);
    }

    /// Lets a test keep a handle on the fetcher it gives to the runner
    struct SharedFetcher(Arc<ScriptedFetcher>);

    #[async_trait]
    impl Fetcher for SharedFetcher {
        async fn fetch(
            &self,
            url: &str,
        ) -> std::result::Result<crate::fetcher::TimedResponse, crate::fetcher::FetchError>
        {
            self.0.fetch(url).await
        }
    }
}
