//! Per-frame recognition pipeline.
//!
//! ```text
//! landmarks ─► Classifier ─► MotionTracker ─┬─ swipe ───────────────► message
//!                                           ├─ GestureConfirmer ───► message
//!                                           └─ PointerThrottle ────► message
//! ```
//!
//! Pointer tracking follows the raw POINTING label and is not gated by hold
//! confirmation, so the cursor follows the hand before the laser gesture is
//! confirmed.

use gestureflow_common::clock::TimestampMs;
use gestureflow_common::config::RecognitionConfig;
use gestureflow_protocol::gesture::{GestureLabel, HandObservation, HandPosition};
use gestureflow_protocol::landmark::LandmarkSet;
use gestureflow_protocol::message::ActionMessage;

use crate::classifier::Classifier;
use crate::confirm::{GestureConfirmer, HoldTimings};
use crate::motion::MotionTracker;
use crate::throttle::PointerThrottle;

/// Everything produced by one processed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    pub observation: HandObservation,
    /// Messages in emission order.
    pub messages: Vec<ActionMessage>,
}

/// Owns all per-session recognition state. Single writer: the loop.
#[derive(Debug, Clone)]
pub struct RecognitionSession {
    classifier: Classifier,
    motion: MotionTracker,
    confirmer: GestureConfirmer,
    throttle: PointerThrottle,
    last_observation: HandObservation,
}

impl Default for RecognitionSession {
    fn default() -> Self {
        Self::new(&RecognitionConfig::default())
    }
}

impl RecognitionSession {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            classifier: Classifier::from_config(config),
            motion: MotionTracker::from_config(config),
            confirmer: GestureConfirmer::new(HoldTimings::from_config(config)),
            throttle: PointerThrottle::from_config(config),
            last_observation: HandObservation::initial(),
        }
    }

    pub fn last_observation(&self) -> &HandObservation {
        &self.last_observation
    }

    pub fn confirmer(&self) -> &GestureConfirmer {
        &self.confirmer
    }

    pub fn motion(&self) -> &MotionTracker {
        &self.motion
    }

    /// Process one frame with zero or one tracked hand.
    pub fn process(&mut self, hand: Option<&LandmarkSet>, now_ms: TimestampMs) -> FrameOutput {
        let output = match hand {
            Some(hand) => self.process_detection(hand, now_ms),
            None => self.process_loss(),
        };
        self.last_observation = output.observation;
        output
    }

    fn process_detection(&mut self, hand: &LandmarkSet, now_ms: TimestampMs) -> FrameOutput {
        let classification = self.classifier.classify(hand);
        let swipe = self
            .motion
            .update(classification.palm_x, classification.palm_y, now_ms);
        let gesture = swipe.unwrap_or(classification.label);

        let observation = HandObservation {
            detected: true,
            position: HandPosition::mirrored(
                classification.palm_x,
                classification.palm_y,
                classification.depth,
            ),
            gesture,
            tilt: classification.tilt,
        };

        let mut messages = Vec::new();
        if gesture.is_swipe() {
            messages.push(ActionMessage::gesture(gesture));
        } else if let Some(confirmed) = self.confirmer.observe(gesture, now_ms) {
            messages.push(ActionMessage::gesture(confirmed));
        }

        if gesture == GestureLabel::Pointing && self.throttle.try_acquire(now_ms) {
            messages.push(ActionMessage::pointer(
                observation.position.x,
                observation.position.y,
            ));
        }

        FrameOutput {
            observation,
            messages,
        }
    }

    fn process_loss(&mut self) -> FrameOutput {
        self.motion.reset();
        self.confirmer.reset();
        FrameOutput {
            observation: HandObservation::lost(self.last_observation.position),
            messages: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;

    #[test]
    fn test_observation_is_mirrored() {
        let mut session = RecognitionSession::default();
        let out = session.process(Some(&poses::open_palm().at(0.2, 0.4).build()), 0.0);

        assert!(out.observation.detected);
        assert_eq!(out.observation.gesture, GestureLabel::OpenPalm);
        assert!((out.observation.position.x - 0.8).abs() < 1e-9);
        assert!((out.observation.position.y - 0.4).abs() < 1e-9);
        assert!(out.messages.is_empty());
    }

    #[test]
    fn test_pointer_follows_raw_pointing_before_confirmation() {
        let mut session = RecognitionSession::default();
        let hand = poses::pointing().at(0.25, 0.5).build();
        let out = session.process(Some(&hand), 0.0);

        assert_eq!(out.messages.len(), 1);
        match out.messages[0] {
            ActionMessage::Pointer { x, y } => {
                assert!((x - 0.75).abs() < 1e-9);
                assert!((y - 0.5).abs() < 1e-9);
            }
            other => panic!("expected pointer, got {other:?}"),
        }
    }

    #[test]
    fn test_confirmed_gesture_precedes_pointer_in_same_frame() {
        let mut session = RecognitionSession::default();
        let hand = poses::pointing().build();
        for t in (0..600).step_by(20) {
            session.process(Some(&hand), t as f64);
        }
        let out = session.process(Some(&hand), 600.0);
        assert_eq!(
            out.messages[0],
            ActionMessage::gesture(GestureLabel::Pointing)
        );
        assert!(matches!(out.messages[1], ActionMessage::Pointer { .. }));
    }

    #[test]
    fn test_swipe_overrides_label_for_one_frame_and_skips_confirmation() {
        let mut session = RecognitionSession::default();
        session.process(Some(&poses::open_palm().at(0.3, 0.5).build()), 0.0);
        let hold_before = session.confirmer().state();

        let out = session.process(Some(&poses::open_palm().at(0.5, 0.5).build()), 50.0);
        assert_eq!(out.observation.gesture, GestureLabel::SwipeRight);
        assert_eq!(
            out.messages,
            vec![ActionMessage::gesture(GestureLabel::SwipeRight)]
        );
        assert_eq!(session.confirmer().state(), hold_before);

        let out = session.process(Some(&poses::open_palm().at(0.5, 0.5).build()), 80.0);
        assert_eq!(out.observation.gesture, GestureLabel::OpenPalm);
    }

    #[test]
    fn test_hand_loss_resets_state_and_keeps_position() {
        let mut session = RecognitionSession::default();
        let hand = poses::closed_fist().at(0.4, 0.6).build();
        session.process(Some(&hand), 0.0);
        session.process(Some(&hand), 500.0);

        let lost = session.process(None, 520.0);
        assert!(!lost.observation.detected);
        assert_eq!(lost.observation.gesture, GestureLabel::None);
        assert!((lost.observation.position.x - 0.6).abs() < 1e-9);
        assert!(!session.motion().has_baseline());
        assert_eq!(
            session.confirmer().state().last_label,
            GestureLabel::None
        );

        // The hold restarts from the re-detection.
        session.process(Some(&hand), 540.0);
        let out = session.process(Some(&hand), 900.0);
        assert!(out.messages.is_empty());
    }

    #[test]
    fn test_initial_loss_reports_center() {
        let mut session = RecognitionSession::default();
        let out = session.process(None, 0.0);
        assert_eq!(out.observation, HandObservation::initial());
    }
}
