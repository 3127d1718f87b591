//! Offline classification of a landmark recording.

use std::path::PathBuf;

use gestureflow_common::config::AppConfig;
use gestureflow_protocol::landmark::parse_frames;
use gestureflow_recognition::Classifier;

pub fn run(config: &AppConfig, path: PathBuf) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)?;
    let parsed = parse_frames(&content);
    for rejected in &parsed.rejected {
        tracing::warn!(line = rejected.line, error = %rejected.error, "Skipping malformed frame");
    }
    let frames = parsed.frames;
    let classifier = Classifier::from_config(&config.recognition);

    for (i, frame) in frames.iter().enumerate() {
        let t = frame
            .timestamp_ms
            .map(|t| format!("{t:.0}"))
            .unwrap_or_else(|| "-".to_string());
        match &frame.landmarks {
            Some(hand) => {
                let c = classifier.classify(hand);
                println!(
                    "{i:>5} t={t:>8} {:<12} palm=({:.3}, {:.3}) pinch={:.3}",
                    c.label.as_str(),
                    c.palm_x,
                    c.palm_y,
                    c.pinch_metric
                );
            }
            None => println!("{i:>5} t={t:>8} (no hand)"),
        }
    }

    println!();
    println!("{} frames, {} malformed lines skipped", frames.len(), parsed.rejected.len());
    Ok(())
}
