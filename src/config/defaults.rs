//! Default values and configuration presets

use super::{ConcurrencyMode, OutputConfig, RunConfig};
use std::time::Duration;

/// Default configuration values
pub struct Defaults;

impl Defaults {
    pub const RUN_COUNT: u32 = 100;
    pub const TIMEOUT_SECONDS: u64 = 30;
    pub const SEQUENTIAL_OUTPUT: &'static str = "seq_fetch_times.csv";
    pub const PARALLEL_OUTPUT: &'static str = "par_fetch_times.csv";

    /// Sample site benchmarked when no URLs are given
    pub const SAMPLE_SITE: &'static str = "http://www.scion-sample.org";

    /// `(port, path)` pairs served by the sample site; `None` is the default port
    const SAMPLE_RESOURCES: &'static [(Option<u16>, &'static str)] = &[
        (None, ""),
        (None, "favicon.ico"),
        (None, "hello-world"),
        (None, "sample-json"),
        (None, "sample-text"),
        (Some(8899), "SCION_Lec.m3u8"),
        (Some(8899), "SCION_Lec_100.m4s"),
        (Some(8181), "sample-image"),
        (Some(8181), "sample-gif"),
        (Some(8181), "sample-audio"),
        (Some(8181), "sample-video"),
    ];

    /// Expand the sample site into its full URL list
    pub fn sample_urls() -> Vec<String> {
        Self::SAMPLE_RESOURCES
            .iter()
            .map(|(port, path)| match port {
                Some(port) => format!("{}:{}/{}", Self::SAMPLE_SITE, port, path),
                None => format!("{}/{}", Self::SAMPLE_SITE, path),
            })
            .collect()
    }
}

impl RunConfig {
    /// Sequential configuration over the given URLs with default settings
    pub fn with_urls(urls: Vec<String>) -> Self {
        Self {
            urls,
            run_count: Defaults::RUN_COUNT,
            concurrency_mode: ConcurrencyMode::Sequential,
            proxy: None,
            timeout: Duration::from_secs(Defaults::TIMEOUT_SECONDS),
            max_workers: None,
            headers: vec![],
            insecure: false,
            output: OutputConfig {
                verbose: false,
                path: Some(Self::default_output_path(ConcurrencyMode::Sequential)),
                summary_json: None,
            },
        }
    }
}
