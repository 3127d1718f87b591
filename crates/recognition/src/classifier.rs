//! Stateless geometric gesture classifier.
//!
//! A finger counts as bent when its tip is closer to the wrist than its PIP
//! joint. The thumb is only used for the pinch metric: thumb-tip to
//! index-tip distance divided by the hand scale (wrist to middle-finger
//! base). First matching rule wins:
//!
//! | rule | label |
//! |---|---|
//! | all four bent | `CLOSED_FIST` |
//! | all four extended | `OPEN_PALM` |
//! | only index extended | `POINTING` |
//! | pinch metric below pinch threshold | `PINCH` |
//! | pinch metric above spread threshold | `SPREAD` |
//! | otherwise | `NONE` |

use gestureflow_common::config::RecognitionConfig;
use gestureflow_protocol::gesture::GestureLabel;
use gestureflow_protocol::landmark::{index, LandmarkSet};

/// Guards the pinch metric against a degenerate zero-size hand.
const SCALE_EPSILON: f64 = 1e-6;

/// (tip, pip) for index, middle, ring, pinky.
const FINGERS: [(usize, usize); 4] = [
    (index::INDEX_TIP, index::INDEX_PIP),
    (index::MIDDLE_TIP, index::MIDDLE_PIP),
    (index::RING_TIP, index::RING_PIP),
    (index::PINKY_TIP, index::PINKY_PIP),
];

/// Result of classifying one landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: GestureLabel,
    /// Average of the wrist and the index/pinky base knuckles (unmirrored).
    pub palm_x: f64,
    pub palm_y: f64,
    /// Depth of the middle-finger base.
    pub depth: f64,
    /// Angle of the wrist → middle-finger-base vector (radians).
    pub tilt: f64,
    /// Thumb-index distance relative to hand scale.
    pub pinch_metric: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classifier {
    pinch_threshold: f64,
    spread_threshold: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&RecognitionConfig::default())
    }
}

impl Classifier {
    pub fn from_config(config: &RecognitionConfig) -> Self {
        Self {
            pinch_threshold: config.pinch_threshold,
            spread_threshold: config.spread_threshold,
        }
    }

    pub fn classify(&self, hand: &LandmarkSet) -> Classification {
        let wrist = hand.point(index::WRIST);
        let middle_mcp = hand.point(index::MIDDLE_MCP);
        let index_mcp = hand.point(index::INDEX_MCP);
        let pinky_mcp = hand.point(index::PINKY_MCP);

        let scale = wrist.planar_distance(middle_mcp) + SCALE_EPSILON;
        let pinch_metric = hand
            .point(index::THUMB_TIP)
            .planar_distance(hand.point(index::INDEX_TIP))
            / scale;

        let label = self.label_for(finger_bends(hand), pinch_metric);

        Classification {
            label,
            palm_x: (wrist.x + index_mcp.x + pinky_mcp.x) / 3.0,
            palm_y: (wrist.y + index_mcp.y + pinky_mcp.y) / 3.0,
            depth: middle_mcp.z,
            tilt: (middle_mcp.y - wrist.y).atan2(middle_mcp.x - wrist.x),
            pinch_metric,
        }
    }

    fn label_for(&self, bent: [bool; 4], pinch_metric: f64) -> GestureLabel {
        match bent {
            [true, true, true, true] => GestureLabel::ClosedFist,
            [false, false, false, false] => GestureLabel::OpenPalm,
            [false, true, true, true] => GestureLabel::Pointing,
            _ if pinch_metric < self.pinch_threshold => GestureLabel::Pinch,
            _ if pinch_metric > self.spread_threshold => GestureLabel::Spread,
            _ => GestureLabel::None,
        }
    }
}

/// Bent state of index, middle, ring, pinky.
pub fn finger_bends(hand: &LandmarkSet) -> [bool; 4] {
    let wrist = hand.point(index::WRIST);
    FINGERS.map(|(tip, pip)| {
        hand.point(tip).planar_distance(wrist) < hand.point(pip).planar_distance(wrist)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;
    use proptest::prelude::*;

    fn classify(builder: poses::PoseBuilder) -> Classification {
        Classifier::default().classify(&builder.build())
    }

    #[test]
    fn test_basic_poses() {
        assert_eq!(classify(poses::closed_fist()).label, GestureLabel::ClosedFist);
        assert_eq!(classify(poses::open_palm()).label, GestureLabel::OpenPalm);
        assert_eq!(classify(poses::pointing()).label, GestureLabel::Pointing);
        assert_eq!(classify(poses::pinch()).label, GestureLabel::Pinch);
        assert_eq!(classify(poses::spread()).label, GestureLabel::Spread);
        assert_eq!(classify(poses::relaxed()).label, GestureLabel::None);
    }

    #[test]
    fn test_palm_center_and_tilt() {
        let c = classify(poses::open_palm().at(0.3, 0.6).depth(-0.02));
        assert!((c.palm_x - 0.3).abs() < 1e-9);
        assert!((c.palm_y - 0.6).abs() < 1e-9);
        assert_eq!(c.depth, -0.02);
        // Fingers point up the image: wrist → middle base is straight up.
        assert!((c.tilt + std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn test_fist_wins_over_pinch_metric() {
        // Thumb tucked onto the curled index tip: tiny pinch metric, still a fist.
        let c = classify(poses::closed_fist().thumb_gap(0.05));
        assert!(c.pinch_metric < 0.22);
        assert_eq!(c.label, GestureLabel::ClosedFist);
    }

    #[test]
    fn test_pointing_requires_only_index() {
        let two = poses::PoseBuilder::new([true, false, false, true]).thumb_gap(0.33);
        assert_eq!(classify(two).label, GestureLabel::None);
    }

    #[test]
    fn test_thresholds_follow_config() {
        let config = RecognitionConfig {
            pinch_threshold: 0.4,
            ..RecognitionConfig::default()
        };
        let classifier = Classifier::from_config(&config);
        assert_eq!(
            classifier.classify(&poses::relaxed().build()).label,
            GestureLabel::Pinch
        );
    }

    fn palm_position() -> impl Strategy<Value = (f64, f64)> {
        (0.2f64..0.8, 0.3f64..0.7)
    }

    proptest! {
        #[test]
        fn prop_all_bent_is_fist_regardless_of_thumb(
            (px, py) in palm_position(),
            tx in 0.0f64..1.0,
            ty in 0.0f64..1.0,
        ) {
            let hand = poses::closed_fist().at(px, py).thumb_tip(tx, ty).build();
            prop_assert_eq!(Classifier::default().classify(&hand).label, GestureLabel::ClosedFist);
        }

        #[test]
        fn prop_all_extended_is_open_palm(
            (px, py) in palm_position(),
            tx in 0.0f64..1.0,
            ty in 0.0f64..1.0,
        ) {
            let hand = poses::open_palm().at(px, py).thumb_tip(tx, ty).build();
            prop_assert_eq!(Classifier::default().classify(&hand).label, GestureLabel::OpenPalm);
        }

        #[test]
        fn prop_index_only_is_pointing(
            (px, py) in palm_position(),
            tx in 0.0f64..1.0,
            ty in 0.0f64..1.0,
        ) {
            let hand = poses::pointing().at(px, py).thumb_tip(tx, ty).build();
            prop_assert_eq!(Classifier::default().classify(&hand).label, GestureLabel::Pointing);
        }

        #[test]
        fn prop_mixed_fingers_follow_pinch_metric(gap in 0.0f64..1.5) {
            let c = classify(poses::PoseBuilder::new([true, true, false, false]).thumb_gap(gap));
            let expected = if c.pinch_metric < 0.22 {
                GestureLabel::Pinch
            } else if c.pinch_metric > 0.45 {
                GestureLabel::Spread
            } else {
                GestureLabel::None
            };
            prop_assert_eq!(c.label, expected);
        }
    }
}
