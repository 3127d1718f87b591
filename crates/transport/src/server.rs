//! Dispatcher-side listener.

use std::net::SocketAddr;

use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::message::ActionMessage;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

pub struct TransportServer {
    listener: TcpListener,
}

impl TransportServer {
    /// Bind the listening socket. Failure here is fatal for the dispatcher.
    pub async fn bind(address: &str) -> GestureflowResult<Self> {
        let listener = TcpListener::bind(address).await.map_err(|e| {
            GestureflowError::transport(format!("failed to bind {address}: {e}"))
        })?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> GestureflowResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the receiving side of `tx` is dropped.
    /// Each connection is read on its own task.
    pub async fn serve(self, tx: mpsc::Sender<ActionMessage>) -> GestureflowResult<()> {
        let local = self.local_addr()?;
        tracing::info!(address = %local, "Listening for action messages");

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!(error = %e, "Accept failed");
                            continue;
                        }
                    };
                    tracing::info!(peer = %peer, "Recognizer connected");
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        match read_messages(BufReader::new(stream), &tx).await {
                            Ok(count) => {
                                tracing::info!(peer = %peer, messages = count, "Recognizer disconnected");
                            }
                            Err(e) => {
                                tracing::warn!(peer = %peer, error = %e, "Connection closed with error");
                            }
                        }
                    });
                }
                _ = tx.closed() => {
                    tracing::info!("Message receiver closed, stopping listener");
                    return Ok(());
                }
            }
        }
    }
}

/// Decode messages line by line and forward them. Returns the number of
/// messages forwarded once the reader reaches end of stream.
pub async fn read_messages<R>(reader: R, tx: &mpsc::Sender<ActionMessage>) -> GestureflowResult<u64>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match ActionMessage::decode_line(&line) {
            Ok(message) => {
                tx.send(message)
                    .await
                    .map_err(|_| GestureflowError::transport("message receiver dropped"))?;
                forwarded += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed message");
            }
        }
    }
    Ok(forwarded)
}
