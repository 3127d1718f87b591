//! GestureFlow Recognition
//!
//! Turns a stream of hand landmark frames into discrete action messages:
//!
//! - **Classifier:** stateless geometric label per frame
//! - **Motion tracker:** horizontal palm velocity → swipes, with cooldown
//! - **Confirmer:** hold-time gating, one emission per continuous hold
//! - **Pointer throttle:** rate-limited cursor positions while pointing
//!
//! [`RecognitionLoop`] drives a [`RecognitionSession`] from a
//! [`FrameSource`], forwards messages to a [`MessageSink`], and publishes
//! every observation: the latest on a watch channel, each one on a
//! broadcast channel.

pub mod classifier;
pub mod confirm;
pub mod motion;
pub mod poses;
pub mod session;
pub mod sources;
pub mod throttle;

pub use classifier::{Classification, Classifier};
pub use session::{FrameOutput, RecognitionSession};
pub use sources::{FrameSource, LatestFrames, ReplaySource, SubprocessSource};

use std::sync::Arc;

use gestureflow_common::clock::SessionClock;
use gestureflow_common::config::RecognitionConfig;
use gestureflow_common::error::GestureflowResult;
use gestureflow_protocol::gesture::HandObservation;
use gestureflow_protocol::landmark::Frame;
use gestureflow_transport::MessageSink;
use tokio::sync::{broadcast, watch};

/// Per-frame observations buffered for slow broadcast subscribers.
const OBSERVATION_BACKLOG: usize = 256;

/// Cloneable handle that ends a running [`RecognitionLoop`], even while it
/// is waiting for a frame.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`stop`](Self::stop) has been called.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames: u64,
    pub frames_with_hand: u64,
    pub frames_dropped: u64,
    pub messages_sent: u64,
    pub send_failures: u64,
}

/// Couples a frame source, the recognition session, and a message sink.
pub struct RecognitionLoop {
    session: RecognitionSession,
    sink: Box<dyn MessageSink>,
    clock: SessionClock,
    stop: StopHandle,
    observations: watch::Sender<HandObservation>,
    frame_observations: broadcast::Sender<HandObservation>,
    stats: LoopStats,
}

impl RecognitionLoop {
    pub fn new(config: &RecognitionConfig, sink: Box<dyn MessageSink>) -> Self {
        let (observations, _) = watch::channel(HandObservation::initial());
        let (frame_observations, _) = broadcast::channel(OBSERVATION_BACKLOG);
        Self {
            session: RecognitionSession::new(config),
            sink,
            clock: SessionClock::start(),
            stop: StopHandle::new(),
            observations,
            frame_observations,
            stats: LoopStats::default(),
        }
    }

    /// Observe the latest hand observation.
    pub fn subscribe(&self) -> watch::Receiver<HandObservation> {
        self.observations.subscribe()
    }

    /// Receive one observation per processed frame. A subscriber that falls
    /// more than a few hundred frames behind gets `Lagged`.
    pub fn subscribe_frames(&self) -> broadcast::Receiver<HandObservation> {
        self.frame_observations.subscribe()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Handle for stopping the loop from another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn session(&self) -> &RecognitionSession {
        &self.session
    }

    /// Run until the source ends or the loop is stopped. A stop request
    /// interrupts a pending frame wait or replay pacing sleep.
    pub async fn run(&mut self, mut source: Box<dyn FrameSource>) -> GestureflowResult<LoopStats> {
        tracing::info!(
            source = %source.name(),
            sink = %self.sink.name(),
            live = source.is_live(),
            epoch = %self.clock.epoch_wall(),
            "Recognition started"
        );

        let stop = self.stop.clone();
        if source.is_live() {
            let mut latest = LatestFrames::spawn(source);
            loop {
                let frame = tokio::select! {
                    biased;
                    _ = stop.stopped() => break,
                    frame = latest.next() => frame,
                };
                let Some(frame) = frame else {
                    break;
                };
                self.process_frame(&frame).await;
            }
            self.stats.frames_dropped = latest.dropped();
        } else {
            loop {
                let frame = tokio::select! {
                    biased;
                    _ = stop.stopped() => break,
                    frame = source.next_frame() => frame?,
                };
                let Some(frame) = frame else {
                    break;
                };
                self.process_frame(&frame).await;
            }
        }

        tracing::info!(
            frames = self.stats.frames,
            with_hand = self.stats.frames_with_hand,
            dropped = self.stats.frames_dropped,
            sent = self.stats.messages_sent,
            failed = self.stats.send_failures,
            "Recognition stopped"
        );
        Ok(self.stats)
    }

    /// Process one frame and deliver its messages in emission order.
    pub async fn process_frame(&mut self, frame: &Frame) -> FrameOutput {
        let now_ms = frame
            .timestamp_ms
            .unwrap_or_else(|| self.clock.now_ms());

        let output = self.session.process(frame.landmarks.as_ref(), now_ms);
        self.stats.frames += 1;
        if output.observation.detected {
            self.stats.frames_with_hand += 1;
        }

        for message in &output.messages {
            tracing::debug!(?message, t = now_ms, "Emitting action message");
            match self.sink.send(message).await {
                Ok(()) => self.stats.messages_sent += 1,
                Err(e) => {
                    self.stats.send_failures += 1;
                    tracing::warn!(sink = %self.sink.name(), error = %e, "Failed to deliver message");
                }
            }
        }

        self.observations.send_replace(output.observation);
        // No subscribers is fine.
        let _ = self.frame_observations.send(output.observation);
        output
    }
}
