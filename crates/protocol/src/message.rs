//! Messages carried from recognition to the dispatcher.
//!
//! One JSON object per line:
//!
//! ```text
//! {"type":"gesture","gesture":"SWIPE_RIGHT"}
//! {"type":"pointer","x":0.42,"y":0.37}
//! ```

use gestureflow_common::error::{GestureflowError, GestureflowResult};
use serde::{Deserialize, Serialize};

use crate::gesture::GestureLabel;

/// A wire-level action message. Immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionMessage {
    /// A confirmed (or swipe) gesture.
    Gesture { gesture: GestureLabel },

    /// Pointer position in normalized, mirrored coordinates.
    Pointer {
        /// Normalized X coordinate [0.0, 1.0].
        x: f64,
        /// Normalized Y coordinate [0.0, 1.0].
        y: f64,
    },
}

impl ActionMessage {
    pub fn gesture(gesture: GestureLabel) -> Self {
        Self::Gesture { gesture }
    }

    /// Pointer message; coordinates are clamped into `[0, 1]`.
    pub fn pointer(x: f64, y: f64) -> Self {
        Self::Pointer {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }

    /// The carried label, for gesture messages.
    pub fn gesture_label(&self) -> Option<GestureLabel> {
        match self {
            Self::Gesture { gesture } => Some(*gesture),
            Self::Pointer { .. } => None,
        }
    }

    /// Encode as a single newline-terminated line.
    pub fn encode_line(&self) -> GestureflowResult<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Decode one line. Unknown types or labels are protocol errors.
    pub fn decode_line(line: &str) -> GestureflowResult<Self> {
        serde_json::from_str(line.trim())
            .map_err(|e| GestureflowError::protocol(format!("invalid message {line:?}: {e}")))
    }
}
