//! Velocity-based swipe detection.

use gestureflow_common::clock::{ms_to_secs, TimestampMs};
use gestureflow_common::config::RecognitionConfig;
use gestureflow_protocol::gesture::GestureLabel;

/// Smallest time step used for velocity, so back-to-back frames with equal
/// timestamps do not divide by zero.
const MIN_DT_MS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct CenterSample {
    x: f64,
    y: f64,
    timestamp_ms: TimestampMs,
}

/// Swipe tracker state: previous palm centre and the cooldown clock.
#[derive(Debug, Clone)]
pub struct MotionTracker {
    previous: Option<CenterSample>,
    last_swipe_ms: Option<TimestampMs>,
    velocity_threshold: f64,
    cooldown_ms: f64,
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::from_config(&RecognitionConfig::default())
    }
}

impl MotionTracker {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            previous: None,
            last_swipe_ms: None,
            velocity_threshold: config.swipe_velocity,
            cooldown_ms: config.swipe_cooldown_ms,
        }
    }

    /// Feed the palm centre of a detected hand. Returns a swipe label when
    /// horizontal velocity exceeds the threshold outside the cooldown.
    pub fn update(&mut self, x: f64, y: f64, now_ms: TimestampMs) -> Option<GestureLabel> {
        let swipe = self.previous.and_then(|prev| {
            let dt_ms = (now_ms - prev.timestamp_ms).max(MIN_DT_MS);
            let velocity = (x - prev.x) / ms_to_secs(dt_ms);
            let cooled = self
                .last_swipe_ms
                .map_or(true, |last| now_ms - last > self.cooldown_ms);

            if velocity.abs() > self.velocity_threshold && cooled {
                Some(if velocity > 0.0 {
                    GestureLabel::SwipeRight
                } else {
                    GestureLabel::SwipeLeft
                })
            } else {
                None
            }
        });

        if let Some(label) = swipe {
            tracing::debug!(gesture = %label, "Swipe detected");
            self.last_swipe_ms = Some(now_ms);
        }
        self.previous = Some(CenterSample {
            x,
            y,
            timestamp_ms: now_ms,
        });
        swipe
    }

    /// Hand lost: drop the velocity baseline. The cooldown clock survives.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    /// Palm centre of the previous detection, if any.
    pub fn previous_center(&self) -> Option<(f64, f64)> {
        self.previous.map(|p| (p.x, p.y))
    }
}
