//! Timed fetcher abstraction
//!
//! A [`Fetcher`] performs a single GET and reports how long it took. The
//! runner only depends on this trait, so tests can drive it with scripted
//! fetchers while the binary uses [`HttpFetcher`].

pub mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A completed request: the server answered, whatever the status
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedResponse {
    pub status: u16,
    pub elapsed: Duration,
}

impl TimedResponse {
    pub fn new(status: u16, elapsed: Duration) -> Self {
        Self { status, elapsed }
    }

    /// 2xx responses count as successful fetches
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that produced no response at all
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// DNS, connect, TLS or protocol failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// No complete response within the per-fetch timeout
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// One blocking-style request-and-time operation
#[async_trait]
pub trait Fetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Result<TimedResponse, FetchError>;
}
