//! GestureFlow CLI
//!
//! Command-line interface for running the recognizer and the dispatcher.
//!
//! Usage:
//!   gestureflow track --source-cmd "python3 landmarker.py"
//!   gestureflow track --replay session.jsonl --realtime --print-observations
//!   gestureflow bridge --escalate
//!   gestureflow check
//!   gestureflow classify session.jsonl

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gestureflow_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "gestureflow")]
#[command(about = "Hand-gesture control for presentations and the pointer")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the per-user config location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recognize gestures from a landmark stream and send them to the bridge
    Track {
        /// Landmark-producing command, one JSON frame per stdout line
        #[arg(long, conflicts_with_all = ["replay", "demo"])]
        source_cmd: Option<String>,

        /// Replay frames from a JSONL file
        #[arg(long, conflicts_with = "demo")]
        replay: Option<PathBuf>,

        /// Pace replayed frames by their timestamps
        #[arg(long)]
        realtime: bool,

        /// Run the built-in scripted gesture sequence
        #[arg(long)]
        demo: bool,

        /// Bridge address (overrides config)
        #[arg(long)]
        addr: Option<String>,

        /// Print every hand observation as a JSON line on stdout
        #[arg(long)]
        print_observations: bool,
    },

    /// Receive action messages and execute them
    Bridge {
        /// Listen address (overrides config)
        #[arg(long)]
        addr: Option<String>,

        /// Skip native input injection
        #[arg(long)]
        no_native: bool,

        /// Retry failed actions on the next available tier
        #[arg(long)]
        escalate: bool,
    },

    /// Check display and execution backend availability
    Check,

    /// Classify each frame of a landmark JSONL file
    Classify {
        /// Path to the JSONL file
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    gestureflow_common::logging::init_logging(&config.logging);

    match cli.command {
        Commands::Track {
            source_cmd,
            replay,
            realtime,
            demo,
            addr,
            print_observations,
        } => {
            if let Some(addr) = addr {
                config.transport.address = addr;
            }
            let source = match (source_cmd, replay) {
                (Some(cmd), _) => commands::track::SourceArg::Command(cmd),
                (None, Some(path)) => commands::track::SourceArg::Replay { path, realtime },
                (None, None) if demo => commands::track::SourceArg::Demo,
                (None, None) => {
                    anyhow::bail!("choose a frame source: --source-cmd, --replay, or --demo")
                }
            };
            commands::track::run(&config, source, print_observations).await
        }
        Commands::Bridge {
            addr,
            no_native,
            escalate,
        } => {
            if let Some(addr) = addr {
                config.transport.address = addr;
            }
            if no_native {
                config.dispatcher.native_enabled = false;
            }
            if escalate {
                config.dispatcher.escalate_on_failure = true;
            }
            commands::bridge::run(&config).await
        }
        Commands::Check => commands::check::run(&config),
        Commands::Classify { path } => commands::classify::run(&config, path),
    }
}
