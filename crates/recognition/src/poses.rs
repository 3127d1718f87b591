//! Synthetic hand poses.
//!
//! Builds anatomically plausible 21-point landmark sets with the fingers
//! pointing up the image, so that classification, replay, and the demo
//! source can run without a camera.

use gestureflow_protocol::landmark::{index, Frame, Landmark, LandmarkSet, LANDMARK_COUNT};

/// Distance from the wrist to the middle-finger base; the hand scale.
pub const HAND_SCALE: f64 = 0.1;

/// Base knuckle offsets from the wrist for index, middle, ring, pinky.
const MCP_OFFSETS: [(f64, f64); 4] = [(-0.03, -0.1), (0.0, -0.1), (0.03, -0.1), (0.05, -0.08)];

/// Builder for one synthetic hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseBuilder {
    palm_x: f64,
    palm_y: f64,
    /// Extended state of index, middle, ring, pinky.
    extended: [bool; 4],
    thumb_tip: Option<(f64, f64)>,
    thumb_gap: Option<f64>,
    depth: f64,
}

impl PoseBuilder {
    /// A hand centred on the image with the given fingers extended
    /// (index, middle, ring, pinky).
    pub fn new(extended: [bool; 4]) -> Self {
        Self {
            palm_x: 0.5,
            palm_y: 0.5,
            extended,
            thumb_tip: None,
            thumb_gap: None,
            depth: 0.0,
        }
    }

    /// Place the palm centre (unmirrored image coordinates).
    pub fn at(mut self, palm_x: f64, palm_y: f64) -> Self {
        self.palm_x = palm_x;
        self.palm_y = palm_y;
        self
    }

    /// Put the thumb tip at an absolute position.
    pub fn thumb_tip(mut self, x: f64, y: f64) -> Self {
        self.thumb_tip = Some((x, y));
        self.thumb_gap = None;
        self
    }

    /// Put the thumb tip `gap` hand-scales to the left of the index tip.
    pub fn thumb_gap(mut self, gap: f64) -> Self {
        self.thumb_gap = Some(gap);
        self.thumb_tip = None;
        self
    }

    /// Depth reported on every landmark.
    pub fn depth(mut self, z: f64) -> Self {
        self.depth = z;
        self
    }

    fn wrist(&self) -> (f64, f64) {
        let (ix, iy) = MCP_OFFSETS[0];
        let (px, py) = MCP_OFFSETS[3];
        (
            self.palm_x - (ix + px) / 3.0,
            self.palm_y - (iy + py) / 3.0,
        )
    }

    pub fn build(&self) -> LandmarkSet {
        let z = self.depth;
        let (wx, wy) = self.wrist();
        let mut points = [Landmark::new(wx, wy, z); LANDMARK_COUNT];

        let fingers = [
            index::INDEX_MCP,
            index::MIDDLE_MCP,
            index::RING_MCP,
            index::PINKY_MCP,
        ];
        for (finger, mcp_idx) in fingers.into_iter().enumerate() {
            let (dx, dy) = MCP_OFFSETS[finger];
            let (mx, my) = (wx + dx, wy + dy);
            points[mcp_idx] = Landmark::new(mx, my, z);
            points[mcp_idx + 1] = Landmark::new(mx, my - 0.04, z);
            if self.extended[finger] {
                points[mcp_idx + 2] = Landmark::new(mx, my - 0.07, z);
                points[mcp_idx + 3] = Landmark::new(mx, my - 0.1, z);
            } else {
                // Curled back toward the palm, inside the PIP radius.
                points[mcp_idx + 2] = Landmark::new(mx, my - 0.02, z);
                points[mcp_idx + 3] = Landmark::new(mx, my + 0.01, z);
            }
        }

        points[index::THUMB_CMC] = Landmark::new(wx - 0.03, wy - 0.02, z);
        points[index::THUMB_MCP] = Landmark::new(wx - 0.06, wy - 0.04, z);
        points[index::THUMB_IP] = Landmark::new(wx - 0.08, wy - 0.06, z);

        let index_tip = points[index::INDEX_TIP];
        let (tx, ty) = match (self.thumb_tip, self.thumb_gap) {
            (Some(tip), _) => tip,
            (None, Some(gap)) => (index_tip.x - gap * HAND_SCALE, index_tip.y),
            (None, None) => (wx - 0.1, wy - 0.07),
        };
        points[index::THUMB_TIP] = Landmark::new(tx, ty, z);

        LandmarkSet::new(points)
    }
}

pub fn open_palm() -> PoseBuilder {
    PoseBuilder::new([true; 4])
}

pub fn closed_fist() -> PoseBuilder {
    PoseBuilder::new([false; 4])
}

pub fn pointing() -> PoseBuilder {
    PoseBuilder::new([true, false, false, false])
}

/// Index and middle extended with the thumb touching the index tip.
pub fn pinch() -> PoseBuilder {
    PoseBuilder::new([true, true, false, false]).thumb_gap(0.1)
}

/// Index and middle extended with the thumb held wide.
pub fn spread() -> PoseBuilder {
    PoseBuilder::new([true, true, false, false]).thumb_gap(0.6)
}

/// Index and middle extended with the thumb at a neutral distance.
pub fn relaxed() -> PoseBuilder {
    PoseBuilder::new([true, true, false, false]).thumb_gap(0.33)
}

/// Frame spacing of [`demo_sequence`] (ms).
pub const DEMO_FRAME_MS: f64 = 1000.0 / 30.0;

/// A scripted session at 30 fps: open palm held, a fast swipe, a pointing
/// sweep across the screen, a held fist, then the hand leaves the frame.
pub fn demo_sequence() -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut t = 0.0;
    let mut push = |hand: Option<LandmarkSet>, frames: &mut Vec<Frame>| {
        frames.push(Frame {
            timestamp_ms: Some(t),
            landmarks: hand,
        });
        t += DEMO_FRAME_MS;
    };

    for _ in 0..40 {
        push(Some(open_palm().build()), &mut frames);
    }
    for step in 0..4 {
        let x = 0.5 - 0.08 * f64::from(step);
        push(Some(open_palm().at(x, 0.5).build()), &mut frames);
    }
    for step in 0..45 {
        let x = 0.7 - 0.4 * f64::from(step) / 44.0;
        push(Some(pointing().at(x, 0.45).build()), &mut frames);
    }
    for _ in 0..30 {
        push(Some(closed_fist().at(0.3, 0.45).build()), &mut frames);
    }
    for _ in 0..10 {
        push(None, &mut frames);
    }
    frames
}
