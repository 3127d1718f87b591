//! Run the recognizer against a frame source.

use std::path::PathBuf;

use gestureflow_common::config::AppConfig;
use gestureflow_recognition::sources::{FrameSource, ReplaySource, SubprocessSource};
use gestureflow_recognition::{poses, RecognitionLoop};
use gestureflow_transport::TransportClient;
use tokio::sync::broadcast::error::RecvError;

pub enum SourceArg {
    Command(String),
    Replay { path: PathBuf, realtime: bool },
    Demo,
}

pub async fn run(
    config: &AppConfig,
    source: SourceArg,
    print_observations: bool,
) -> anyhow::Result<()> {
    let source: Box<dyn FrameSource> = match source {
        SourceArg::Command(cmd) => Box::new(SubprocessSource::from_command_line(&cmd)?),
        SourceArg::Replay { path, realtime } => {
            Box::new(ReplaySource::open(&path)?.realtime(realtime))
        }
        SourceArg::Demo => {
            Box::new(ReplaySource::from_frames(poses::demo_sequence()).realtime(true))
        }
    };

    let client = TransportClient::connect(&config.transport).await;
    let mut recognition = RecognitionLoop::new(&config.recognition, Box::new(client));

    let printer = print_observations.then(|| {
        let mut rx = recognition.subscribe_frames();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(observation) => match serde_json::to_string(&observation) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!(error = %e, "Failed to encode observation"),
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Observation printer fell behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    });

    let stop = recognition.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.stop();
        }
    });

    eprintln!("Tracking to {} (Ctrl+C to stop)", config.transport.address);
    let stats = recognition.run(source).await?;
    drop(recognition);
    if let Some(printer) = printer {
        printer.await.ok();
    }

    eprintln!();
    eprintln!("Frames:        {}", stats.frames);
    eprintln!("  with hand:   {}", stats.frames_with_hand);
    eprintln!("  dropped:     {}", stats.frames_dropped);
    eprintln!("Messages sent: {}", stats.messages_sent);
    eprintln!("Send failures: {}", stats.send_failures);
    Ok(())
}
