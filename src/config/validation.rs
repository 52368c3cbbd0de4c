//! Configuration validation logic
//!
//! Everything here runs before the first fetch so that a bad configuration
//! fails without touching the network.

use super::RunConfig;
use crate::constants::MAX_RUN_COUNT;
use crate::errors::{BenchError, Result};
use std::collections::HashSet;
use url::Url;

/// Validate the configuration
pub fn validate(config: &RunConfig) -> Result<()> {
    validate_urls(config)?;
    validate_run_config(config)?;
    validate_proxy(config)?;
    validate_headers(config)?;
    Ok(())
}

/// Validate target URLs
fn validate_urls(config: &RunConfig) -> Result<()> {
    if config.urls.is_empty() {
        return Err(BenchError::config("At least one URL is required"));
    }

    let mut seen = HashSet::new();
    for url in &config.urls {
        // Url::parse drops embedded newlines and tabs; the raw string is the column header
        if url.chars().any(char::is_control) {
            return Err(BenchError::config(format!(
                "Target URL {:?} contains control characters",
                url
            )));
        }
        validate_http_url(url, "target URL")?;
        if !seen.insert(url.as_str()) {
            return Err(BenchError::config(format!(
                "Duplicate URL '{}'. Each URL is one table column and must be unique",
                url
            )));
        }
    }
    Ok(())
}

fn validate_http_url(raw: &str, what: &str) -> Result<()> {
    let url = Url::parse(raw)
        .map_err(|e| BenchError::config(format!("Invalid {} '{}': {}", what, raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(BenchError::config(format!(
            "Invalid URL scheme '{}' for {} '{}'. Only 'http' and 'https' are supported",
            scheme, what, raw
        ))),
    }
}

/// Validate run count, timeout and worker limit
fn validate_run_config(config: &RunConfig) -> Result<()> {
    if config.run_count == 0 {
        return Err(BenchError::config("Run count must be greater than 0"));
    }

    if config.run_count > MAX_RUN_COUNT {
        return Err(BenchError::config(format!(
            "Run count cannot exceed {}",
            MAX_RUN_COUNT
        )));
    }

    if config.timeout.is_zero() {
        return Err(BenchError::config("Timeout must be greater than 0"));
    }

    if config.max_workers == Some(0) {
        return Err(BenchError::config("Max workers must be greater than 0"));
    }

    Ok(())
}

/// Validate proxy endpoints
fn validate_proxy(config: &RunConfig) -> Result<()> {
    if let Some(proxy) = &config.proxy {
        for endpoint in [&proxy.http, &proxy.https].into_iter().flatten() {
            Url::parse(endpoint).map_err(|e| {
                BenchError::config(format!("Invalid proxy URL '{}': {}", endpoint, e))
            })?;
        }
    }
    Ok(())
}

/// Validate custom headers format
fn validate_headers(config: &RunConfig) -> Result<()> {
    for header in &config.headers {
        if !header.contains(':') {
            return Err(BenchError::config(format!(
                "Invalid header format '{}'. Use 'Key: Value' format",
                header
            )));
        }
    }
    Ok(())
}
