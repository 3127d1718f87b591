//! GestureFlow Transport
//!
//! Carries [`ActionMessage`]s from the recognizer to the dispatcher as one
//! JSON object per line over TCP.
//!
//! - **Client:** connects lazily, drops messages while disconnected, and
//!   retries the connection at most once per reconnect interval.
//! - **Server:** accepts any number of connections and forwards every
//!   decoded message into a channel. Malformed lines are skipped.
//!
//! Delivery is best-effort: nothing is buffered or redelivered.

pub mod client;
pub mod server;

pub use client::TransportClient;
pub use server::TransportServer;

use async_trait::async_trait;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::message::ActionMessage;
use tokio::sync::mpsc;

/// Destination for recognized action messages.
#[async_trait]
pub trait MessageSink: Send {
    /// Deliver one message. Failures are reported, never retried.
    async fn send(&mut self, message: &ActionMessage) -> GestureflowResult<()>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// In-process sink, used when recognition and dispatch share a process.
#[async_trait]
impl MessageSink for mpsc::Sender<ActionMessage> {
    async fn send(&mut self, message: &ActionMessage) -> GestureflowResult<()> {
        mpsc::Sender::send(self, *message)
            .await
            .map_err(|_| GestureflowError::transport("message receiver dropped"))
    }

    fn name(&self) -> &str {
        "channel"
    }
}
