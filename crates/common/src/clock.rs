//! Session clock.
//!
//! Every timestamp inside the recognition pipeline is expressed in
//! fractional milliseconds relative to a monotonic epoch captured when the
//! session starts, mirroring the frame timestamps produced by landmark
//! models.

use std::time::Instant;

/// Milliseconds since session start.
pub type TimestampMs = f64;

/// A session clock that provides monotonic millisecond timestamps relative
/// to a fixed epoch.
#[derive(Debug, Clone)]
pub struct SessionClock {
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the epoch.
    pub fn now_ms(&self) -> TimestampMs {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Convert a millisecond interval to seconds.
pub fn ms_to_secs(ms: TimestampMs) -> f64 {
    ms / 1000.0
}
