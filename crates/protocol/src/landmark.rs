//! Hand landmark sets and the per-frame JSONL format.
//!
//! A frame line looks like:
//!
//! ```text
//! {"t": 1234.5, "landmarks": [[0.51, 0.72, 0.0], ... 21 points]}
//! {"t": 1268.0, "landmarks": null}
//! ```
//!
//! Points may also be given as `{"x":..,"y":..,"z":..}` objects, which is
//! what most hand-landmarker bindings print natively.

use gestureflow_common::clock::TimestampMs;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use serde::{Deserialize, Serialize};

/// Number of landmarks in a tracked hand.
pub const LANDMARK_COUNT: usize = 21;

/// Fixed semantic landmark indices.
pub mod index {
    pub const WRIST: usize = 0;
    pub const THUMB_CMC: usize = 1;
    pub const THUMB_MCP: usize = 2;
    pub const THUMB_IP: usize = 3;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP: usize = 13;
    pub const RING_PIP: usize = 14;
    pub const RING_DIP: usize = 15;
    pub const RING_TIP: usize = 16;
    pub const PINKY_MCP: usize = 17;
    pub const PINKY_PIP: usize = 18;
    pub const PINKY_DIP: usize = 19;
    pub const PINKY_TIP: usize = 20;
}

/// One normalized hand point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr", into = "[f64; 3]")]
pub struct Landmark {
    /// Horizontal position in `[0.0, 1.0]` of the image width (unmirrored).
    pub x: f64,
    /// Vertical position in `[0.0, 1.0]` of the image height.
    pub y: f64,
    /// Depth relative to the wrist.
    pub z: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Array([f64; 3]),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Array([x, y, z]) => Self { x, y, z },
            LandmarkRepr::Object { x, y, z } => Self { x, y, z },
        }
    }
}

impl From<Landmark> for [f64; 3] {
    fn from(point: Landmark) -> Self {
        [point.x, point.y, point.z]
    }
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in the image plane, ignoring depth.
    pub fn planar_distance(&self, other: &Landmark) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Exactly [`LANDMARK_COUNT`] ordered points for one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build from a slice, rejecting anything that is not a full hand.
    pub fn from_slice(points: &[Landmark]) -> GestureflowResult<Self> {
        let points: [Landmark; LANDMARK_COUNT] = points.try_into().map_err(|_| {
            GestureflowError::protocol(format!(
                "expected {LANDMARK_COUNT} landmarks, got {}",
                points.len()
            ))
        })?;
        Ok(Self { points })
    }

    /// Landmark at a semantic index (see [`index`]).
    pub fn point(&self, idx: usize) -> &Landmark {
        &self.points[idx]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkSet {
    type Error = GestureflowError;

    fn try_from(points: Vec<Landmark>) -> Result<Self, Self::Error> {
        Self::from_slice(&points)
    }
}

impl From<LandmarkSet> for Vec<Landmark> {
    fn from(set: LandmarkSet) -> Self {
        set.points.to_vec()
    }
}

/// One processed camera frame: zero or one tracked hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame timestamp (ms). Sources stamp frames themselves when absent.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<TimestampMs>,

    /// The tracked hand, if any.
    #[serde(default)]
    pub landmarks: Option<LandmarkSet>,
}

impl Frame {
    pub fn with_hand(timestamp_ms: TimestampMs, hand: LandmarkSet) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            landmarks: Some(hand),
        }
    }

    pub fn empty(timestamp_ms: TimestampMs) -> Self {
        Self {
            timestamp_ms: Some(timestamp_ms),
            landmarks: None,
        }
    }
}

/// Parse a single frame line.
pub fn parse_frame(line: &str) -> GestureflowResult<Frame> {
    serde_json::from_str(line.trim())
        .map_err(|e| GestureflowError::protocol(format!("invalid frame: {e}")))
}

/// Whether a JSONL line carries no frame (blank or `#` comment).
pub fn is_skippable_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// A JSONL line that did not parse as a frame.
#[derive(Debug)]
pub struct RejectedLine {
    /// 1-based line number.
    pub line: usize,
    pub error: GestureflowError,
}

/// Result of parsing a whole recording.
#[derive(Debug, Default)]
pub struct ParsedFrames {
    pub frames: Vec<Frame>,
    pub rejected: Vec<RejectedLine>,
}

/// Parse frames from JSONL content. Blank and comment lines are skipped;
/// malformed lines are collected in `rejected` and do not stop parsing.
pub fn parse_frames(jsonl: &str) -> ParsedFrames {
    let mut parsed = ParsedFrames::default();
    for (i, line) in jsonl.lines().enumerate() {
        if is_skippable_line(line) {
            continue;
        }
        match parse_frame(line) {
            Ok(frame) => parsed.frames.push(frame),
            Err(error) => parsed.rejected.push(RejectedLine { line: i + 1, error }),
        }
    }
    parsed
}
