//! Configuration loader
//!
//! Loads [`TelemeterConfig`] from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from `TELEMETER_*` environment variables
//! 2. If none are set, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `TELEMETER_ACCURACY`: histogram compression
//! - `TELEMETER_GRANULARITY`: `minute`, `hour` or `day`
//! - `TELEMETER_MAX_BINS`: past bins retained between flushes
//! - `TELEMETER_REPORTING_INTERVAL`: reporting interval in seconds
//! - `TELEMETER_SOURCE`: source name attached to every point
//! - `TELEMETER_PROXY_METRICS_ADDR`: proxy address for scalar metrics
//! - `TELEMETER_PROXY_DISTRIBUTION_ADDR`: proxy address for distributions
//! - `TELEMETER_LOG_FORMAT`: `text` or `json`
//! - `TELEMETER_LOG_FILTER`: `EnvFilter` directive
//!
//! Unset variables keep their defaults.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./telemeter.{json,toml}` (current working directory)
//! 2. `./config.{json,toml}` (current working directory)
//! 3. The same names next to the executable

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use telemeter_domain::{TelemeterConfig, TelemeterError, TelemeterResult};

const CONFIG_FILE_NAMES: [&str; 4] =
    ["telemeter.json", "telemeter.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `TelemeterError::Config` if neither source yields a valid
/// configuration.
pub fn load() -> TelemeterResult<TelemeterConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment not usable, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `TELEMETER_*` environment variables
///
/// # Errors
/// Returns `TelemeterError::Config` if no variable is set, a value does not
/// parse, or the result fails validation.
pub fn load_from_env() -> TelemeterResult<TelemeterConfig> {
    config_from_vars(|key| std::env::var(key).ok())
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `TelemeterError::Config` if the file is missing, unreadable,
/// malformed, or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> TelemeterResult<TelemeterConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TelemeterError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TelemeterError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TelemeterError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Probe the standard locations for a configuration file
///
/// Returns the first file found, or `None`.
#[must_use]
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn parse_config(contents: &str, path: &Path) -> TelemeterResult<TelemeterConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TelemeterError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TelemeterError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TelemeterError::Config(format!("Unsupported config format: {extension}"))),
    }
}

fn config_from_vars(lookup: impl Fn(&str) -> Option<String>) -> TelemeterResult<TelemeterConfig> {
    let mut config = TelemeterConfig::default();
    let mut found = false;
    let mut var = |key: &str| {
        let value = lookup(key);
        found |= value.is_some();
        value
    };

    if let Some(v) = var("TELEMETER_ACCURACY") {
        config.histogram.accuracy = parse_var("TELEMETER_ACCURACY", &v)?;
    }
    if let Some(v) = var("TELEMETER_GRANULARITY") {
        config.histogram.granularity = parse_var("TELEMETER_GRANULARITY", &v)?;
    }
    if let Some(v) = var("TELEMETER_MAX_BINS") {
        config.histogram.max_bins = parse_var("TELEMETER_MAX_BINS", &v)?;
    }
    if let Some(v) = var("TELEMETER_REPORTING_INTERVAL") {
        config.reporter.reporting_interval_secs = parse_var("TELEMETER_REPORTING_INTERVAL", &v)?;
    }
    if let Some(v) = var("TELEMETER_SOURCE") {
        config.reporter.source = v;
    }
    if let Some(v) = var("TELEMETER_PROXY_METRICS_ADDR") {
        config.sender.metrics_addr = v;
    }
    if let Some(v) = var("TELEMETER_PROXY_DISTRIBUTION_ADDR") {
        config.sender.distribution_addr = v;
    }
    if let Some(v) = var("TELEMETER_LOG_FORMAT") {
        config.logging.format = parse_var("TELEMETER_LOG_FORMAT", &v)?;
    }
    if let Some(v) = var("TELEMETER_LOG_FILTER") {
        config.logging.filter = v;
    }

    if !found {
        return Err(TelemeterError::Config("No TELEMETER_* environment variables set".into()));
    }

    config.validate()?;
    Ok(config)
}

fn parse_var<T>(key: &str, raw: &str) -> TelemeterResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| TelemeterError::Config(format!("Invalid value for {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use telemeter_domain::{Granularity, LogFormat};

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn no_variables_means_not_configured() {
        let result = config_from_vars(vars(&[]));
        assert!(matches!(result, Err(TelemeterError::Config(_))));
    }

    #[test]
    fn variables_override_defaults() {
        let config = config_from_vars(vars(&[
            ("TELEMETER_ACCURACY", "200"),
            ("TELEMETER_GRANULARITY", "Hour"),
            ("TELEMETER_REPORTING_INTERVAL", " 30 "),
            ("TELEMETER_SOURCE", "api-7"),
            ("TELEMETER_LOG_FORMAT", "json"),
        ]))
        .expect("valid environment");

        assert_eq!(config.histogram.accuracy, 200);
        assert_eq!(config.histogram.granularity, Granularity::Hour);
        assert_eq!(config.histogram.max_bins, 10);
        assert_eq!(config.reporter.reporting_interval_secs, 30);
        assert_eq!(config.reporter.source, "api-7");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.sender, TelemeterConfig::default().sender);
    }

    #[test]
    fn unparsable_values_are_reported() {
        let err = config_from_vars(vars(&[("TELEMETER_MAX_BINS", "lots")]))
            .expect_err("not a number");
        assert!(err.to_string().contains("TELEMETER_MAX_BINS"));

        let err = config_from_vars(vars(&[("TELEMETER_GRANULARITY", "week")]))
            .expect_err("unknown granularity");
        assert!(err.to_string().contains("TELEMETER_GRANULARITY"));
    }

    #[test]
    fn values_are_validated() {
        let result = config_from_vars(vars(&[("TELEMETER_REPORTING_INTERVAL", "0")]));
        assert!(matches!(result, Err(TelemeterError::Config(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let result = parse_config("{}", Path::new("telemeter.yaml"));
        assert!(matches!(result, Err(TelemeterError::Config(msg)) if msg.contains("yaml")));
    }
}
