//! Wavefront proxy sender
//!
//! Keeps one lazily opened TCP stream per proxy port (metrics and
//! distributions listen separately). A failed write drops the stream so the
//! next send reconnects.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use telemeter_domain::{Centroid, Granularity, PointTags, SenderConfig};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tracing::{trace, warn};

use super::format::{distribution_line, metric_line};
use super::{Sender, SenderError, SenderResult};

#[derive(Debug)]
struct Connection {
    addr: String,
    connect_timeout: Duration,
    stream: Mutex<Option<TcpStream>>,
}

impl Connection {
    fn new(addr: String, connect_timeout: Duration) -> Self {
        Self { addr, connect_timeout, stream: Mutex::new(None) }
    }

    async fn connect(&self) -> SenderResult<TcpStream> {
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(stream)) => {
                trace!(addr = %self.addr, "Connected to proxy");
                Ok(stream)
            }
            Ok(Err(source)) => Err(SenderError::Connect { addr: self.addr.clone(), source }),
            Err(_) => Err(SenderError::Timeout {
                addr: self.addr.clone(),
                timeout: self.connect_timeout,
            }),
        }
    }

    async fn write(&self, payload: &str) -> SenderResult<()> {
        let mut guard = self.stream.lock().await;
        let mut stream = match guard.take() {
            Some(stream) => stream,
            None => self.connect().await?,
        };

        match stream.write_all(payload.as_bytes()).await {
            Ok(()) => {
                *guard = Some(stream);
                Ok(())
            }
            Err(err) => {
                warn!(addr = %self.addr, error = %err, "Proxy write failed, dropping connection");
                Err(SenderError::Io(err))
            }
        }
    }
}

/// Sends points to a Wavefront proxy over TCP.
#[derive(Debug)]
pub struct ProxySender {
    metrics: Connection,
    distributions: Connection,
}

impl ProxySender {
    /// Sender for the proxy at `config`; nothing connects until the first send.
    #[must_use]
    pub fn new(config: &SenderConfig) -> Self {
        Self {
            metrics: Connection::new(config.metrics_addr.clone(), config.connect_timeout()),
            distributions: Connection::new(
                config.distribution_addr.clone(),
                config.connect_timeout(),
            ),
        }
    }
}

#[async_trait]
impl Sender for ProxySender {
    async fn send_metric(
        &self,
        name: &str,
        value: f64,
        timestamp_millis: Option<u64>,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()> {
        let line = metric_line(name, value, timestamp_millis, source, tags)?;
        trace!(line = line.trim_end(), "Sending metric");
        self.metrics.write(&line).await
    }

    async fn send_distribution(
        &self,
        name: &str,
        centroids: &[Centroid],
        granularities: &BTreeSet<Granularity>,
        timestamp_secs: u64,
        source: &str,
        tags: &PointTags,
    ) -> SenderResult<()> {
        let mut payload = String::new();
        for granularity in granularities {
            payload.push_str(&distribution_line(
                name,
                centroids,
                *granularity,
                timestamp_secs,
                source,
                tags,
            )?);
        }
        if payload.is_empty() {
            return Ok(());
        }
        trace!(name, lines = granularities.len(), "Sending distribution");
        self.distributions.write(&payload).await
    }
}
