//! GestureFlow Common Utilities
//!
//! Shared infrastructure for all GestureFlow crates:
//! - Error types and result aliases
//! - Session clock for frame and emission timestamps
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
