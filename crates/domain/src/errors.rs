//! Error types used throughout Telemeter

use thiserror::Error;

use crate::types::MetricKind;

/// Main error type for Telemeter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TelemeterError {
    /// The metric cannot be identified (blank name)
    #[error("Invalid metric identity: {0}")]
    InvalidIdentity(String),

    /// A metric of another kind is already registered under the key
    #[error("Metric '{key}' is registered as a {found}, not a {expected}")]
    KindMismatch {
        /// Encoded registry key
        key: String,
        /// Kind the caller asked for
        expected: MetricKind,
        /// Kind stored in the registry
        found: MetricKind,
    },

    /// A sample or argument the metric cannot record
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected failure inside Telemeter
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TelemeterError {
    /// Stable label suitable for log fields.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::InvalidIdentity(_) => "invalid_identity",
            Self::KindMismatch { .. } => "kind_mismatch",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Telemeter operations
pub type TelemeterResult<T> = std::result::Result<T, TelemeterError>;
