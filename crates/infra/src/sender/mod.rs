//! Wire-level metric senders
//!
//! [`Sender`] is the port the reporter writes through. [`ProxySender`]
//! speaks the Wavefront data format to a proxy over TCP.

pub mod format;
mod proxy;

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
pub use proxy::ProxySender;
use telemeter_domain::{Centroid, Granularity, PointTags, TelemeterError};
use thiserror::Error;

/// Sender errors
#[derive(Debug, Error)]
pub enum SenderError {
    /// Writing to an open connection failed
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The proxy refused or dropped the connection attempt
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// Proxy address
        addr: String,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// The connection attempt exceeded the configured timeout
    #[error("Connecting to {addr} timed out after {timeout:?}")]
    Timeout {
        /// Proxy address
        addr: String,
        /// Configured connect timeout
        timeout: Duration,
    },

    /// The point cannot be expressed on the wire
    #[error("Invalid metric: {0}")]
    InvalidMetric(String),
}

impl From<SenderError> for TelemeterError {
    fn from(err: SenderError) -> Self {
        match err {
            SenderError::InvalidMetric(msg) => Self::InvalidInput(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result of a send
pub type SenderResult<T> = Result<T, SenderError>;

/// Destination for exported points.
#[async_trait]
pub trait Sender: Send + Sync {
    /// Send one scalar point. `timestamp_millis = None` lets the backend
    /// stamp the point on arrival.
    ///
    /// # Errors
    ///
    /// Returns [`SenderError`] if the point is invalid or cannot be
    /// delivered.
    async fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp_millis: Option<u64>,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()>;

    /// Send one distribution, once per requested granularity.
    ///
    /// # Errors
    ///
    /// Returns [`SenderError`] if the distribution is invalid or cannot be
    /// delivered.
    async fn send_distribution(
        &self,
        name: &str,
        centroids: &[Centroid],
        granularities: &BTreeSet<Granularity>,
        timestamp_secs: u64,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()>;
}
