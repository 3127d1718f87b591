//! Gesture labels and the per-frame hand observation record.

use serde::{Deserialize, Serialize};

/// Instantaneous gesture label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GestureLabel {
    #[default]
    None,
    OpenPalm,
    ClosedFist,
    Pointing,
    Pinch,
    Spread,
    SwipeLeft,
    SwipeRight,
}

impl GestureLabel {
    pub const ALL: [GestureLabel; 8] = [
        GestureLabel::None,
        GestureLabel::OpenPalm,
        GestureLabel::ClosedFist,
        GestureLabel::Pointing,
        GestureLabel::Pinch,
        GestureLabel::Spread,
        GestureLabel::SwipeLeft,
        GestureLabel::SwipeRight,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::OpenPalm => "OPEN_PALM",
            Self::ClosedFist => "CLOSED_FIST",
            Self::Pointing => "POINTING",
            Self::Pinch => "PINCH",
            Self::Spread => "SPREAD",
            Self::SwipeLeft => "SWIPE_LEFT",
            Self::SwipeRight => "SWIPE_RIGHT",
        }
    }

    /// Velocity-derived labels, delivered without hold confirmation.
    pub fn is_swipe(&self) -> bool {
        matches!(self, Self::SwipeLeft | Self::SwipeRight)
    }
}

impl std::fmt::Display for GestureLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracked hand position. `x` is mirrored so that moving the hand to the
/// user's right moves the reported position right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl HandPosition {
    /// Screen-centre resting position used before the first detection.
    pub const CENTER: HandPosition = HandPosition {
        x: 0.5,
        y: 0.5,
        z: 0.0,
    };

    /// Build from an unmirrored palm centre, clamping into `[0, 1]`.
    pub fn mirrored(raw_x: f64, raw_y: f64, z: f64) -> Self {
        Self {
            x: (1.0 - raw_x).clamp(0.0, 1.0),
            y: raw_y.clamp(0.0, 1.0),
            z,
        }
    }
}

/// Observation record published once per processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandObservation {
    pub detected: bool,
    pub position: HandPosition,
    pub gesture: GestureLabel,
    /// Angle of the wrist → middle-finger-base vector (radians).
    pub tilt: f64,
}

impl HandObservation {
    /// The record before any hand has been seen.
    pub fn initial() -> Self {
        Self {
            detected: false,
            position: HandPosition::CENTER,
            gesture: GestureLabel::None,
            tilt: 0.0,
        }
    }

    /// A fresh "no hand" record that keeps the last known position.
    pub fn lost(last_position: HandPosition) -> Self {
        Self {
            position: last_position,
            ..Self::initial()
        }
    }
}

impl Default for HandObservation {
    fn default() -> Self {
        Self::initial()
    }
}
