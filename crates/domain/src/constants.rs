//! Telemeter constants
//!
//! Centralized defaults for the recognised configuration options.

// Histogram defaults
/// Compression handed to each histogram sketch
pub const DEFAULT_ACCURACY: u32 = 100;
/// Past bins a histogram retains between flushes
pub const DEFAULT_MAX_BINS: usize = 10;

// Granularity window sizes in milliseconds
/// One minute
pub const MINUTE_MILLIS: u64 = 60 * 1000;
/// One hour
pub const HOUR_MILLIS: u64 = MINUTE_MILLIS * 60;
/// One day
pub const DAY_MILLIS: u64 = HOUR_MILLIS * 24;

// Reporter defaults
/// Seconds between export cycles
pub const DEFAULT_REPORTING_INTERVAL_SECS: u64 = 5;
/// Seconds `stop` waits for the background loop
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 3;
/// Point source used when the host name cannot be read
pub const FALLBACK_SOURCE: &str = "localhost";

// Wavefront proxy defaults
/// Proxy listener for metric lines
pub const DEFAULT_PROXY_METRICS_ADDR: &str = "127.0.0.1:2878";
/// Proxy listener for distribution lines
pub const DEFAULT_PROXY_DISTRIBUTION_ADDR: &str = "127.0.0.1:40000";
/// TCP connect timeout in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;

// Registry key encoding
/// Joins a name and its encoded tags in a registry key
pub const TAGS_KEY_SEPARATOR: &str = "-tags=";

// Reported metric name suffixes
/// Appended to counter names on export
pub const COUNTER_SUFFIX: &str = "count";
/// Appended to gauge names on export
pub const GAUGE_SUFFIX: &str = "value";
