//! Recognition loop driving a replayed session into in-memory sinks.

use std::time::Duration;

use async_trait::async_trait;
use gestureflow_common::config::RecognitionConfig;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::gesture::GestureLabel;
use gestureflow_protocol::landmark::Frame;
use gestureflow_protocol::message::ActionMessage;
use gestureflow_recognition::poses;
use gestureflow_recognition::{FrameSource, RecognitionLoop, ReplaySource};
use gestureflow_transport::MessageSink;
use tokio::sync::mpsc;

struct UnreachableSink;

#[async_trait]
impl MessageSink for UnreachableSink {
    async fn send(&mut self, _message: &ActionMessage) -> GestureflowResult<()> {
        Err(GestureflowError::transport("not connected"))
    }

    fn name(&self) -> &str {
        "unreachable"
    }
}

/// A live source that never produces a frame (camera still warming up).
struct SilentCamera;

#[async_trait]
impl FrameSource for SilentCamera {
    fn name(&self) -> &str {
        "silent"
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn next_frame(&mut self) -> GestureflowResult<Option<Frame>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn demo_sequence_emits_expected_gestures_in_order() {
    let (tx, mut rx) = mpsc::channel(1024);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));
    let observations = recognition.subscribe();

    let frames = poses::demo_sequence();
    let total = frames.len() as u64;
    let stats = recognition
        .run(Box::new(ReplaySource::from_frames(frames)))
        .await
        .unwrap();

    let mut received = Vec::new();
    while let Ok(message) = rx.try_recv() {
        received.push(message);
    }

    let labels: Vec<GestureLabel> = received.iter().filter_map(|m| m.gesture_label()).collect();
    assert_eq!(
        labels,
        vec![
            GestureLabel::OpenPalm,
            GestureLabel::SwipeLeft,
            GestureLabel::Pointing,
            GestureLabel::ClosedFist,
        ]
    );
    assert!(received
        .iter()
        .any(|m| matches!(m, ActionMessage::Pointer { .. })));

    assert_eq!(stats.frames, total);
    assert_eq!(stats.frames_with_hand, total - 10);
    assert_eq!(stats.frames_dropped, 0);
    assert_eq!(stats.messages_sent, received.len() as u64);
    assert_eq!(stats.send_failures, 0);

    let last = *observations.borrow();
    assert!(!last.detected);
    assert_eq!(last.gesture, GestureLabel::None);
}

#[tokio::test]
async fn unreachable_sink_does_not_stop_the_loop() {
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(UnreachableSink));

    let frames: Vec<Frame> = (0..50)
        .map(|i| Frame::with_hand(f64::from(i) * 20.0, poses::pointing().build()))
        .collect();
    let stats = recognition
        .run(Box::new(ReplaySource::from_frames(frames)))
        .await
        .unwrap();

    assert_eq!(stats.frames, 50);
    assert_eq!(stats.messages_sent, 0);
    assert!(stats.send_failures > 0);
}

#[tokio::test]
async fn frames_without_timestamp_use_session_clock() {
    let (tx, _rx) = mpsc::channel(16);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));

    let frame = Frame {
        timestamp_ms: None,
        landmarks: Some(poses::open_palm().at(0.25, 0.5).build()),
    };
    let out = recognition.process_frame(&frame).await;

    assert!(out.observation.detected);
    assert!((out.observation.position.x - 0.75).abs() < 1e-9);
    assert_eq!(recognition.stats().frames, 1);
}

#[tokio::test]
async fn stop_before_run_processes_no_frames() {
    let (tx, _rx) = mpsc::channel(16);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));
    recognition.stop();

    let stats = recognition
        .run(Box::new(ReplaySource::from_frames(poses::demo_sequence())))
        .await
        .unwrap();
    assert_eq!(stats.frames, 0);
}

#[tokio::test]
async fn stop_interrupts_a_silent_live_source() {
    let (tx, _rx) = mpsc::channel(16);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));
    let stop = recognition.stop_handle();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();
    });

    let stats = tokio::time::timeout(
        Duration::from_secs(2),
        recognition.run(Box::new(SilentCamera)),
    )
    .await
    .expect("run should return after stop")
    .unwrap();
    assert_eq!(stats.frames, 0);
    assert!(recognition.stop_handle().is_stopped());
}

#[tokio::test]
async fn stop_interrupts_realtime_replay_pacing() {
    let (tx, _rx) = mpsc::channel(16);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));
    let stop = recognition.stop_handle();

    // Second frame is an hour after the first.
    let frames = vec![Frame::empty(0.0), Frame::empty(3_600_000.0)];
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stop.stop();
    });

    let stats = tokio::time::timeout(
        Duration::from_secs(2),
        recognition.run(Box::new(ReplaySource::from_frames(frames).realtime(true))),
    )
    .await
    .expect("run should return after stop")
    .unwrap();
    assert_eq!(stats.frames, 1);
}

#[tokio::test]
async fn every_frame_observation_is_broadcast() {
    let (tx, _rx) = mpsc::channel(1024);
    let mut recognition = RecognitionLoop::new(&RecognitionConfig::default(), Box::new(tx));
    let mut per_frame = recognition.subscribe_frames();

    let frames: Vec<Frame> = (0..40)
        .map(|i| {
            if i % 2 == 0 {
                Frame::with_hand(f64::from(i) * 10.0, poses::open_palm().build())
            } else {
                Frame::empty(f64::from(i) * 10.0)
            }
        })
        .collect();
    recognition
        .run(Box::new(ReplaySource::from_frames(frames)))
        .await
        .unwrap();

    let mut detected = Vec::new();
    while let Ok(observation) = per_frame.try_recv() {
        detected.push(observation.detected);
    }
    assert_eq!(detected.len(), 40);
    assert!(detected.iter().step_by(2).all(|d| *d));
    assert!(detected.iter().skip(1).step_by(2).all(|d| !*d));
}
