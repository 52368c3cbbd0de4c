//! Application-wide constants and configuration values

// Results table layout
pub const RUN_LABEL_PREFIX: &str = "fetch_";
pub const CSV_DELIMITER: char = ',';

// Run limits
pub const MAX_RUN_COUNT: u32 = 1_000_000;

// Progress indication
pub const PROGRESS_DOT_INTERVAL_MS: u64 = 500;

// Report formatting
pub const TIME_PRECISION: usize = 9;
pub const STDDEV_PRECISION: usize = 6;
pub const RATE_PRECISION: usize = 4;
pub const REPORT_RULE: &str = "═══════════════════════════════════════════════════════════════";
