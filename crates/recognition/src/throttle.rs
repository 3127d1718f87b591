//! Pointer rate limiting.

use gestureflow_common::clock::TimestampMs;
use gestureflow_common::config::RecognitionConfig;

/// Allows at most one pointer message per interval.
#[derive(Debug, Clone)]
pub struct PointerThrottle {
    interval_ms: f64,
    last_sent_ms: Option<TimestampMs>,
}

impl Default for PointerThrottle {
    fn default() -> Self {
        Self::from_config(&RecognitionConfig::default())
    }
}

impl PointerThrottle {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self::new(config.pointer_interval_ms)
    }

    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_sent_ms: None,
        }
    }

    /// Returns true and records the send when a pointer message may go out.
    /// The first call always passes.
    pub fn try_acquire(&mut self, now_ms: TimestampMs) -> bool {
        match self.last_sent_ms {
            Some(last) if now_ms - last < self.interval_ms => false,
            _ => {
                self.last_sent_ms = Some(now_ms);
                true
            }
        }
    }

    pub fn last_sent_ms(&self) -> Option<TimestampMs> {
        self.last_sent_ms
    }
}
