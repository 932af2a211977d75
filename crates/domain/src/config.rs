//! Configuration structures
//!
//! Every section carries `#[serde(default)]`, so partial JSON/TOML documents
//! fill the gaps with the documented defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCURACY, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_MAX_BINS,
    DEFAULT_PROXY_DISTRIBUTION_ADDR, DEFAULT_PROXY_METRICS_ADDR, DEFAULT_REPORTING_INTERVAL_SECS,
    DEFAULT_STOP_TIMEOUT_SECS, FALLBACK_SOURCE,
};
use crate::errors::{TelemeterError, TelemeterResult};
use crate::impl_enum_conversions;
use crate::types::{Granularity, PointTags};

/// Settings for histograms created through registry factories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistogramConfig {
    /// Compression handed to each shard sketch
    pub accuracy: u32,
    /// Width of each time window
    pub granularity: Granularity,
    /// Past bins retained between flushes
    pub max_bins: usize,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            accuracy: DEFAULT_ACCURACY,
            granularity: Granularity::default(),
            max_bins: DEFAULT_MAX_BINS,
        }
    }
}

impl HistogramConfig {
    /// Check the settings can build a histogram.
    ///
    /// # Errors
    ///
    /// Returns [`TelemeterError::Config`] if `accuracy` or `max_bins` is zero.
    pub fn validate(&self) -> TelemeterResult<()> {
        if self.accuracy == 0 {
            return Err(TelemeterError::Config("histogram.accuracy must be > 0".into()));
        }
        if self.max_bins == 0 {
            return Err(TelemeterError::Config("histogram.max_bins must be > 0".into()));
        }
        Ok(())
    }
}

/// Settings for the periodic reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// Seconds between export cycles
    pub reporting_interval_secs: u64,
    /// Seconds `stop` waits for the background loop
    pub stop_timeout_secs: u64,
    /// Host name attached to every exported point; defaults to this machine's
    pub source: String,
    /// Tags merged into every exported point; these win over metric tags on collision
    pub application_tags: PointTags,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            reporting_interval_secs: DEFAULT_REPORTING_INTERVAL_SECS,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
            source: local_hostname(),
            application_tags: PointTags::new(),
        }
    }
}

/// Host name of this machine, or [`FALLBACK_SOURCE`] when it cannot be read.
#[must_use]
pub fn local_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_SOURCE.to_string())
}

impl ReporterConfig {
    /// Reporting period as a `Duration`.
    #[must_use]
    pub const fn reporting_interval(&self) -> Duration {
        Duration::from_secs(self.reporting_interval_secs)
    }

    /// Grace period for stopping the reporter.
    #[must_use]
    pub const fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// # Errors
    ///
    /// Returns [`TelemeterError::Config`] for a zero interval or a blank source.
    pub fn validate(&self) -> TelemeterResult<()> {
        if self.reporting_interval_secs == 0 {
            return Err(TelemeterError::Config("reporter.reporting_interval_secs must be > 0".into()));
        }
        if self.source.trim().is_empty() {
            return Err(TelemeterError::Config("reporter.source must not be blank".into()));
        }
        Ok(())
    }
}

/// Wavefront proxy endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// `host:port` of the proxy's metrics listener
    pub metrics_addr: String,
    /// `host:port` of the proxy's histogram listener
    pub distribution_addr: String,
    /// Upper bound on each TCP connect attempt, in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            metrics_addr: DEFAULT_PROXY_METRICS_ADDR.to_string(),
            distribution_addr: DEFAULT_PROXY_DISTRIBUTION_ADDR.to_string(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

impl SenderConfig {
    /// Connection timeout as a `Duration`.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// # Errors
    ///
    /// Returns [`TelemeterError::Config`] if either address is blank.
    pub fn validate(&self) -> TelemeterResult<()> {
        if self.metrics_addr.trim().is_empty() || self.distribution_addr.trim().is_empty() {
            return Err(TelemeterError::Config("sender addresses must not be blank".into()));
        }
        Ok(())
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl_enum_conversions!(LogFormat {
    Text => "text",
    Json => "json",
});

/// Tracing subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Event output format
    pub format: LogFormat,
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: LogFormat::default(), filter: "info".to_string() }
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemeterConfig {
    /// Defaults for histograms created through the registry
    pub histogram: HistogramConfig,
    /// Export loop settings
    pub reporter: ReporterConfig,
    /// Proxy endpoints
    pub sender: SenderConfig,
    /// Tracing subscriber settings
    pub logging: LoggingConfig,
}

impl TelemeterConfig {
    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first section's [`TelemeterError::Config`].
    pub fn validate(&self) -> TelemeterResult<()> {
        self.histogram.validate()?;
        self.reporter.validate()?;
        self.sender.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_recognised_options() {
        let config = TelemeterConfig::default();
        assert_eq!(config.histogram.accuracy, 100);
        assert_eq!(config.histogram.granularity, Granularity::Minute);
        assert_eq!(config.histogram.max_bins, 10);
        assert_eq!(config.reporter.reporting_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn default_source_is_the_machine_hostname() {
        let expected = hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_SOURCE.to_string());

        assert_eq!(ReporterConfig::default().source, expected);
        assert_eq!(local_hostname(), expected);
        assert!(!expected.trim().is_empty());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: TelemeterConfig = toml::from_str(
            r#"
            [histogram]
            granularity = "hour"

            [reporter]
            source = "web-01"

            [reporter.application_tags]
            app = "checkout"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.histogram.granularity, Granularity::Hour);
        assert_eq!(config.histogram.accuracy, 100);
        assert_eq!(config.reporter.source, "web-01");
        assert_eq!(config.reporter.application_tags.len(), 1);
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn validate_rejects_zero_values() {
        let histogram = HistogramConfig { accuracy: 0, ..HistogramConfig::default() };
        assert!(matches!(histogram.validate(), Err(TelemeterError::Config(_))));

        let histogram = HistogramConfig { max_bins: 0, ..HistogramConfig::default() };
        assert!(histogram.validate().is_err());

        let reporter = ReporterConfig { reporting_interval_secs: 0, ..ReporterConfig::default() };
        assert!(reporter.validate().is_err());
    }
}
