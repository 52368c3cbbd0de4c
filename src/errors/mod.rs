//! Domain-specific error types for fetchbench
//!
//! Fatal errors (configuration, table format, I/O) are carried by
//! [`BenchError`]. Per-fetch failures never propagate and live in
//! [`crate::fetcher::FetchError`] instead.

use thiserror::Error;

/// Main error type for the fetchbench application
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration-related errors (CLI parsing, validation, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or mismatched results tables
    #[error("Table error: {0}")]
    Table(String),

    /// File system errors while reading or writing tables and summaries
    #[error("I/O error: {0}")]
    Io(String),

    /// HTTP client construction errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_config_context(self, msg: &str) -> Result<T>;
    fn with_io_context(self, msg: &str) -> Result<T>;
    fn with_table_context(self, msg: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Config(format!("{}: {}", msg, e)))
    }

    fn with_io_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Io(format!("{}: {}", msg, e)))
    }

    fn with_table_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Table(format!("{}: {}", msg, e)))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Config(msg.to_string()))
    }

    fn with_io_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Io(msg.to_string()))
    }

    fn with_table_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Table(msg.to_string()))
    }
}

// Convenience constructors
impl BenchError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BenchError::Config(msg.into())
    }

    pub fn table<S: Into<String>>(msg: S) -> Self {
        BenchError::Table(msg.into())
    }
}
