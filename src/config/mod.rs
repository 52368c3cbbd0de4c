//! Configuration management for fetchbench
//!
//! This module provides a layered approach to configuration:
//! - Core structures and enums
//! - CLI argument parsing
//! - Configuration validation
//! - Default value management

pub mod defaults;
pub mod parser;
pub mod validation;

use crate::errors::{BenchError, Result};
use defaults::Defaults;
use std::path::PathBuf;
use std::time::Duration;

/// How fetches for different URLs are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConcurrencyMode {
    /// One URL at a time, runs in order
    #[default]
    Sequential,
    /// One worker per URL, all URLs at once
    Parallel,
}

impl ConcurrencyMode {
    pub fn label(&self) -> &'static str {
        match self {
            ConcurrencyMode::Sequential => "Sequential",
            ConcurrencyMode::Parallel => "Parallel",
        }
    }
}

/// Per-scheme proxy endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxyConfig {
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Output configuration
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub verbose: bool,
    /// Export target; `None` disables the export step
    pub path: Option<PathBuf>,
    pub summary_json: Option<PathBuf>,
}

/// Everything one benchmark invocation needs
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub urls: Vec<String>,
    pub run_count: u32,
    pub concurrency_mode: ConcurrencyMode,
    pub proxy: Option<ProxyConfig>,
    pub timeout: Duration,
    pub max_workers: Option<usize>,
    pub headers: Vec<String>,
    pub insecure: bool,
    pub output: OutputConfig,
}

impl RunConfig {
    /// Convert and validate `run` arguments
    pub fn from_run_args(raw: parser::RunArgs) -> Result<Self> {
        let config = Self::try_from(raw)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get custom headers as key-value pairs
    pub fn custom_headers(&self) -> Result<Vec<(String, String)>> {
        let mut headers = Vec::new();
        for header in &self.headers {
            if let Some((key, value)) = header.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            } else {
                return Err(BenchError::config(format!(
                    "Invalid header format '{}'. Use 'Key: Value' format",
                    header
                )));
            }
        }
        Ok(headers)
    }

    /// Export file used when none was given on the command line
    pub fn default_output_path(mode: ConcurrencyMode) -> PathBuf {
        match mode {
            ConcurrencyMode::Sequential => PathBuf::from(Defaults::SEQUENTIAL_OUTPUT),
            ConcurrencyMode::Parallel => PathBuf::from(Defaults::PARALLEL_OUTPUT),
        }
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("{}", self.summary());
    }

    pub fn summary(&self) -> String {
        let mut out = String::from("⏱️  Fetch Benchmark Configuration:\n");
        out.push_str(&format!("   URLs:             {}\n", self.urls.len()));
        for url in &self.urls {
            out.push_str(&format!("                     {}\n", url));
        }
        out.push_str(&format!("   Runs per URL:     {}\n", self.run_count));
        out.push_str(&format!(
            "   Mode:             {}\n",
            self.concurrency_mode.label()
        ));
        if self.concurrency_mode == ConcurrencyMode::Parallel {
            match self.max_workers {
                Some(workers) => out.push_str(&format!("   Max Workers:      {}\n", workers)),
                None => out.push_str("   Max Workers:      unbounded\n"),
            }
        }
        out.push_str(&format!("   Timeout:          {}s\n", self.timeout.as_secs()));

        if let Some(proxy) = &self.proxy {
            if let Some(http) = &proxy.http {
                out.push_str(&format!("   HTTP Proxy:       {}\n", http));
            }
            if let Some(https) = &proxy.https {
                out.push_str(&format!("   HTTPS Proxy:      {}\n", https));
            }
        }

        if !self.headers.is_empty() {
            out.push_str(&format!("   Custom Headers:   {}\n", self.headers.len()));
            for header in &self.headers {
                out.push_str(&format!("                     {}\n", header));
            }
        }

        if self.insecure {
            out.push_str("   Security:         ⚠️  Insecure mode enabled\n");
        }

        match &self.output.path {
            Some(path) => out.push_str(&format!("   Output:           {}\n", path.display())),
            None => out.push_str("   Output:           (export disabled)\n"),
        }

        out
    }
}
