//! Hold confirmation: turns the noisy per-frame label stream into
//! edge-triggered gesture events.
//!
//! A label must be observed continuously for its hold duration before it is
//! emitted, and it is emitted once per continuous occupancy. Swipe labels
//! never reach this machine.

use gestureflow_common::clock::TimestampMs;
use gestureflow_common::config::RecognitionConfig;
use gestureflow_protocol::gesture::GestureLabel;

/// Required continuous hold per label (ms).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldTimings {
    pub pointing_ms: f64,
    pub closed_fist_ms: f64,
    pub open_palm_ms: f64,
    pub pinch_ms: f64,
    pub spread_ms: f64,
    pub default_ms: f64,
}

impl HoldTimings {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            pointing_ms: config.hold_pointing_ms,
            closed_fist_ms: config.hold_closed_fist_ms,
            open_palm_ms: config.hold_open_palm_ms,
            pinch_ms: config.hold_pinch_ms,
            spread_ms: config.hold_spread_ms,
            default_ms: config.hold_default_ms,
        }
    }

    pub fn required(&self, label: GestureLabel) -> f64 {
        match label {
            GestureLabel::Pointing => self.pointing_ms,
            GestureLabel::ClosedFist => self.closed_fist_ms,
            GestureLabel::OpenPalm => self.open_palm_ms,
            GestureLabel::Pinch => self.pinch_ms,
            GestureLabel::Spread => self.spread_ms,
            _ => self.default_ms,
        }
    }
}

impl Default for HoldTimings {
    fn default() -> Self {
        Self::from_config(&RecognitionConfig::default())
    }
}

/// The single armed gesture slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureHoldState {
    pub last_label: GestureLabel,
    pub hold_start_ms: TimestampMs,
    pub emitted: bool,
}

impl GestureHoldState {
    pub fn idle() -> Self {
        Self {
            last_label: GestureLabel::None,
            hold_start_ms: 0.0,
            emitted: false,
        }
    }

    fn arm(label: GestureLabel, now_ms: TimestampMs) -> Self {
        Self {
            last_label: label,
            hold_start_ms: now_ms,
            emitted: false,
        }
    }
}

impl Default for GestureHoldState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Hold-confirmation state machine.
#[derive(Debug, Clone)]
pub struct GestureConfirmer {
    timings: HoldTimings,
    state: GestureHoldState,
}

impl Default for GestureConfirmer {
    fn default() -> Self {
        Self::new(HoldTimings::default())
    }
}

impl GestureConfirmer {
    pub fn new(timings: HoldTimings) -> Self {
        Self {
            timings,
            state: GestureHoldState::idle(),
        }
    }

    pub fn state(&self) -> GestureHoldState {
        self.state
    }

    /// Feed one instantaneous label. Returns the label when it has just
    /// been confirmed. Swipes are never held and leave the state untouched.
    pub fn observe(&mut self, label: GestureLabel, now_ms: TimestampMs) -> Option<GestureLabel> {
        if label.is_swipe() {
            return None;
        }

        if label == GestureLabel::None {
            self.reset();
            return None;
        }

        if self.state.last_label != label {
            self.state = GestureHoldState::arm(label, now_ms);
        }

        let held_ms = now_ms - self.state.hold_start_ms;
        if !self.state.emitted && held_ms >= self.timings.required(label) {
            self.state.emitted = true;
            tracing::debug!(gesture = %label, held_ms, "Gesture confirmed");
            return Some(label);
        }
        None
    }

    /// Hand lost or label cleared.
    pub fn reset(&mut self) {
        self.state = GestureHoldState::idle();
    }
}
