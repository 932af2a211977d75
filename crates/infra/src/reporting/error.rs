//! Reporting error types

use std::time::Duration;

use telemeter_domain::TelemeterError;
use thiserror::Error;

use crate::sender::SenderError;

/// Failure of a single export cycle
#[derive(Debug, Error)]
pub enum ReportError {
    /// A single send failed
    #[error("Send failed: {0}")]
    Send(#[from] SenderError),

    /// Some sends failed; the rest of the cycle still ran
    #[error("{failed} of {attempted} sends failed")]
    Partial {
        /// Sends that returned an error
        failed: usize,
        /// Sends tried this cycle
        attempted: usize,
    },

    /// Domain-level failure while preparing points
    #[error(transparent)]
    Domain(#[from] TelemeterError),
}

/// Reporter lifecycle errors
#[derive(Debug, Error)]
pub enum ReporterError {
    /// `start` was called outside a Tokio runtime
    #[error("No Tokio runtime available to run the reporter")]
    NoRuntime,

    /// The background task did not exit in time; the final flush still ran
    #[error("Reporter task did not stop within {duration:?}")]
    Timeout {
        /// How long `stop` waited
        duration: Duration,
    },

    /// The background task panicked or was aborted
    #[error("Reporter task join failed: {0}")]
    TaskJoinFailed(String),

    /// The report run by `stop` failed; its data was not delivered
    #[error("Final flush failed: {0}")]
    FinalFlush(#[source] ReportError),
}

impl From<ReportError> for TelemeterError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::Domain(inner) => inner,
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<ReporterError> for TelemeterError {
    fn from(err: ReporterError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result of one export cycle
pub type ReportResult<T> = Result<T, ReportError>;

/// Result of a reporter lifecycle call
pub type ReporterResult<T> = Result<T, ReporterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_pass_through_unchanged() {
        let err = ReportError::Domain(TelemeterError::InvalidInput("nan".into()));
        assert_eq!(TelemeterError::from(err), TelemeterError::InvalidInput("nan".into()));
    }

    #[test]
    fn final_flush_message_includes_cause() {
        let err = ReporterError::FinalFlush(ReportError::Partial { failed: 2, attempted: 5 });
        assert_eq!(err.to_string(), "Final flush failed: 2 of 5 sends failed");
    }
}
