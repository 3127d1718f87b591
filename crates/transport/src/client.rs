//! Recognizer-side connection.

use std::time::Duration;

use async_trait::async_trait;
use gestureflow_common::config::TransportConfig;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::message::ActionMessage;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use crate::MessageSink;

/// Best-effort client. Sends fail fast while disconnected, and neither a
/// connection attempt nor a write can take longer than its configured bound.
pub struct TransportClient {
    address: String,
    reconnect_interval: Duration,
    connect_timeout: Duration,
    send_timeout: Duration,
    stream: Option<TcpStream>,
    last_attempt: Option<Instant>,
    sent: u64,
}

impl TransportClient {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            address: config.address.clone(),
            reconnect_interval: Duration::from_millis(config.reconnect_interval_ms),
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            send_timeout: Duration::from_millis(config.send_timeout_ms),
            stream: None,
            last_attempt: None,
            sent: 0,
        }
    }

    /// Create a client and make the initial connection attempt. An
    /// unreachable server is logged, not returned.
    pub async fn connect(config: &TransportConfig) -> Self {
        let mut client = Self::new(config);
        client.try_connect().await;
        client
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Messages written successfully so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    fn may_attempt(&self) -> bool {
        self.last_attempt
            .map_or(true, |last| last.elapsed() >= self.reconnect_interval)
    }

    async fn try_connect(&mut self) {
        self.last_attempt = Some(Instant::now());
        match timeout(self.connect_timeout, TcpStream::connect(&self.address)).await {
            Ok(Ok(stream)) => {
                if let Err(e) = stream.set_nodelay(true) {
                    tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
                }
                tracing::info!(address = %self.address, "Connected to dispatcher");
                self.stream = Some(stream);
            }
            Ok(Err(e)) => {
                tracing::warn!(address = %self.address, error = %e, "Dispatcher unreachable");
            }
            Err(_) => {
                tracing::warn!(
                    address = %self.address,
                    timeout_ms = self.connect_timeout.as_millis() as u64,
                    "Dispatcher connect timed out"
                );
            }
        }
    }

    /// Write one message. While disconnected, a reconnect is attempted if
    /// the interval has passed; otherwise the message is dropped with an
    /// error.
    pub async fn send(&mut self, message: &ActionMessage) -> GestureflowResult<()> {
        if self.stream.is_none() && self.may_attempt() {
            self.try_connect().await;
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(GestureflowError::transport(format!(
                "not connected to {}",
                self.address
            )));
        };

        let line = message.encode_line()?;
        let failure = match timeout(self.send_timeout, stream.write_all(line.as_bytes())).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(format!("connection to {} lost: {e}", self.address)),
            // A partial line may have been written; the stream is unusable.
            Err(_) => Some(format!("{} stopped reading, dropping connection", self.address)),
        };
        if let Some(reason) = failure {
            self.stream = None;
            return Err(GestureflowError::transport(reason));
        }
        self.sent += 1;
        Ok(())
    }
}

#[async_trait]
impl MessageSink for TransportClient {
    async fn send(&mut self, message: &ActionMessage) -> GestureflowResult<()> {
        TransportClient::send(self, message).await
    }

    fn name(&self) -> &str {
        "tcp"
    }
}
