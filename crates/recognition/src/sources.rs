//! Frame sources.
//!
//! All sources yield [`Frame`]s parsed from the same JSONL shape:
//!
//! ```text
//! {"t": 1234.5, "landmarks": [[x, y, z], ... 21 points]}
//! {"t": 1268.0, "landmarks": null}
//! ```
//!
//! Live sources run at camera rate regardless of how fast frames are
//! consumed; they are read through [`LatestFrames`], which keeps only the
//! newest frame. Replayed frames are pulled one by one and never dropped.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gestureflow_common::error::{GestureflowError, GestureflowResult};
use gestureflow_protocol::landmark::{is_skippable_line, parse_frame, parse_frames, Frame};
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Trait for landmark frame producers.
#[async_trait]
pub trait FrameSource: Send {
    /// Source name for logging.
    fn name(&self) -> &str;

    /// Whether frames arrive on their own schedule (camera) rather than on
    /// demand (file).
    fn is_live(&self) -> bool;

    /// Next frame, or `None` at end of stream.
    async fn next_frame(&mut self) -> GestureflowResult<Option<Frame>>;
}

/// Reads frames from the stdout of a landmark-producing process.
pub struct SubprocessSource {
    name: String,
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    malformed: u64,
}

impl SubprocessSource {
    /// Spawn `program args...`. Spawn failure is an acquisition error.
    pub fn spawn(program: &str, args: &[String]) -> GestureflowResult<Self> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                GestureflowError::acquisition(format!("failed to start {program}: {e}"))
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            GestureflowError::acquisition(format!("{program} has no stdout pipe"))
        })?;

        tracing::info!(program, pid = ?child.id(), "Landmark source started");

        Ok(Self {
            name: program.to_string(),
            child,
            lines: BufReader::new(stdout).lines(),
            malformed: 0,
        })
    }

    /// Spawn from a whitespace-separated command line.
    pub fn from_command_line(command_line: &str) -> GestureflowResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| GestureflowError::config("empty landmark source command"))?;
        let args: Vec<String> = parts.collect();
        Self::spawn(&program, &args)
    }

    /// Lines that could not be parsed so far.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }
}

#[async_trait]
impl FrameSource for SubprocessSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_live(&self) -> bool {
        true
    }

    async fn next_frame(&mut self) -> GestureflowResult<Option<Frame>> {
        while let Some(line) = self.lines.next_line().await? {
            if is_skippable_line(&line) {
                continue;
            }
            match parse_frame(&line) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.malformed += 1;
                    tracing::warn!(source = %self.name, error = %e, "Skipping malformed frame");
                }
            }
        }

        let status = self.child.wait().await?;
        tracing::info!(source = %self.name, %status, "Landmark source exited");
        Ok(None)
    }
}

/// Frames loaded up front from a recording or built in memory.
pub struct ReplaySource {
    name: String,
    frames: VecDeque<Frame>,
    realtime: bool,
    anchor: Option<(Instant, f64)>,
    malformed: u64,
}

impl ReplaySource {
    /// Load a JSONL recording. An unreadable file is rejected before any
    /// frame is produced; malformed lines are logged and skipped.
    pub fn open(path: &Path) -> GestureflowResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GestureflowError::acquisition(format!("failed to read {}: {e}", path.display()))
        })?;
        let parsed = parse_frames(&content);
        for rejected in &parsed.rejected {
            tracing::warn!(
                path = %path.display(),
                line = rejected.line,
                error = %rejected.error,
                "Skipping malformed frame"
            );
        }
        tracing::info!(
            path = %path.display(),
            frames = parsed.frames.len(),
            malformed = parsed.rejected.len(),
            "Loaded replay"
        );
        Ok(Self {
            name: path.display().to_string(),
            malformed: parsed.rejected.len() as u64,
            ..Self::from_frames(parsed.frames)
        })
    }

    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self {
            name: "replay".to_string(),
            frames: frames.into(),
            realtime: false,
            anchor: None,
            malformed: 0,
        }
    }

    /// Pace frames by their timestamps instead of yielding them at once.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    /// Lines skipped while loading.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    async fn pace(&mut self, frame: &Frame) {
        let Some(t) = frame.timestamp_ms else {
            return;
        };
        let (start, first_t) = *self.anchor.get_or_insert((Instant::now(), t));
        let offset = Duration::from_secs_f64(((t - first_t) / 1000.0).max(0.0));
        tokio::time::sleep_until(start + offset).await;
    }
}

#[async_trait]
impl FrameSource for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_live(&self) -> bool {
        false
    }

    async fn next_frame(&mut self) -> GestureflowResult<Option<Frame>> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };
        if self.realtime {
            self.pace(&frame).await;
        }
        Ok(Some(frame))
    }
}

/// Latest-frame-wins hand-off from a live source.
///
/// A background task pulls frames as fast as the source produces them and
/// overwrites a single slot; the consumer always sees the newest frame and
/// silently skips anything it was too slow to take.
pub struct LatestFrames {
    rx: watch::Receiver<Option<Frame>>,
    pump: JoinHandle<()>,
    published: Arc<AtomicU64>,
    consumed: u64,
}

impl LatestFrames {
    pub fn spawn(mut source: Box<dyn FrameSource>) -> Self {
        let (tx, rx) = watch::channel(None);
        let published = Arc::new(AtomicU64::new(0));
        let counter = published.clone();

        let pump = tokio::spawn(async move {
            loop {
                match source.next_frame().await {
                    Ok(Some(frame)) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                        if tx.send(Some(frame)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(source = %source.name(), error = %e, "Frame source failed");
                        break;
                    }
                }
            }
        });

        Self {
            rx,
            pump,
            published,
            consumed: 0,
        }
    }

    /// Wait for a frame newer than the last one returned. `None` once the
    /// source has ended and its last frame was taken.
    pub async fn next(&mut self) -> Option<Frame> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(frame) = self.rx.borrow_and_update().clone() {
                self.consumed += 1;
                return Some(frame);
            }
        }
    }

    /// Frames produced but never consumed.
    pub fn dropped(&self) -> u64 {
        self.published
            .load(Ordering::Relaxed)
            .saturating_sub(self.consumed)
    }
}

impl Drop for LatestFrames {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;

    /// A "camera" that produces every frame instantly.
    struct BurstSource {
        remaining: Vec<Frame>,
    }

    #[async_trait]
    impl FrameSource for BurstSource {
        fn name(&self) -> &str {
            "burst"
        }

        fn is_live(&self) -> bool {
            true
        }

        async fn next_frame(&mut self) -> GestureflowResult<Option<Frame>> {
            Ok(self.remaining.pop())
        }
    }

    #[tokio::test]
    async fn test_slow_consumer_only_sees_latest_frame() {
        // Popped from the back: timestamps 0..100 in order.
        let remaining = (0..100).rev().map(|i| Frame::empty(i as f64)).collect();
        let mut latest = LatestFrames::spawn(Box::new(BurstSource { remaining }));

        tokio::time::sleep(Duration::from_millis(50)).await;

        let frame = latest.next().await.unwrap();
        assert_eq!(frame.timestamp_ms, Some(99.0));
        assert_eq!(latest.next().await, None);
        assert_eq!(latest.dropped(), 99);
    }

    #[tokio::test]
    async fn test_replay_yields_every_frame_in_order() {
        let frames = vec![
            Frame::with_hand(0.0, poses::open_palm().build()),
            Frame::empty(10.0),
            Frame::with_hand(20.0, poses::pointing().build()),
        ];
        let mut source = ReplaySource::from_frames(frames.clone());
        assert!(!source.is_live());

        let mut seen = Vec::new();
        while let Some(frame) = source.next_frame().await.unwrap() {
            seen.push(frame);
        }
        assert_eq!(seen, frames);
        assert_eq!(source.remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_realtime_replay_paces_by_timestamp() {
        let frames = vec![Frame::empty(1000.0), Frame::empty(1500.0)];
        let mut source = ReplaySource::from_frames(frames).realtime(true);

        let start = Instant::now();
        source.next_frame().await.unwrap();
        source.next_frame().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[test]
    fn test_missing_replay_file_is_acquisition_error() {
        let err = ReplaySource::open(Path::new("/nonexistent/gestureflow/frames.jsonl"))
            .err()
            .unwrap();
        assert!(matches!(err, GestureflowError::Acquisition { .. }));
    }

    #[tokio::test]
    async fn test_replay_file_skips_malformed_lines() {
        let path = std::env::temp_dir().join(format!(
            "gestureflow-replay-mixed-{}.jsonl",
            std::process::id()
        ));
        let hand =
            serde_json::to_string(&Frame::with_hand(10.0, poses::pointing().build())).unwrap();
        let twenty = vec!["[0.1,0.1,0]"; 20].join(",");
        let short = format!(r#"{{"t":20,"landmarks":[{twenty}]}}"#);
        let content =
            format!("# mixed\n{hand}\n{{broken\n{short}\n{{\"t\":30,\"landmarks\":null}}\n");
        std::fs::write(&path, content).unwrap();

        let mut source = ReplaySource::open(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(source.malformed(), 2);
        assert_eq!(source.remaining(), 2);

        let first = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first.timestamp_ms, Some(10.0));
        assert!(first.landmarks.is_some());
        assert_eq!(source.next_frame().await.unwrap(), Some(Frame::empty(30.0)));
        assert_eq!(source.next_frame().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_program_is_acquisition_error() {
        let err = SubprocessSource::spawn("gestureflow-no-such-landmarker", &[])
            .err()
            .unwrap();
        assert!(matches!(err, GestureflowError::Acquisition { .. }));
    }

    #[tokio::test]
    async fn test_subprocess_frames_skip_malformed_lines() {
        let script = concat!(
            "echo '# landmarker v1'; ",
            "echo '{\"t\":5,\"landmarks\":null}'; ",
            "echo 'garbage'; ",
            "echo '{\"t\":40,\"landmarks\":null}'"
        );
        let mut source =
            SubprocessSource::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap();
        assert!(source.is_live());

        let first = source.next_frame().await.unwrap().unwrap();
        assert_eq!(first, Frame::empty(5.0));
        let second = source.next_frame().await.unwrap().unwrap();
        assert_eq!(second, Frame::empty(40.0));
        assert_eq!(source.next_frame().await.unwrap(), None);
        assert_eq!(source.malformed(), 1);
    }
}
