//! Structured logging initialization.
//!
//! `RUST_LOG` takes precedence over the configured filter.

use telemeter_domain::{LogFormat, LoggingConfig, TelemeterError, TelemeterResult};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `tracing` subscriber.
///
/// # Errors
///
/// Returns `TelemeterError::Config` if the filter directive does not parse or
/// a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> TelemeterResult<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(&config.filter)
            .map_err(|e| TelemeterError::Config(format!("Invalid log filter '{}': {e}", config.filter)))?
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
    };

    result.map_err(|e| TelemeterError::Config(format!("Failed to install tracing subscriber: {e}")))?;
    tracing::debug!(format = %config.format, "Tracing initialized");
    Ok(())
}
