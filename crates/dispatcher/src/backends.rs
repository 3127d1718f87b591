//! Executor backends, one per tier.
//!
//! - **Native:** in-process input injection (pointer and zoom only)
//! - **Helper:** persistent external process, one JSON command per line
//! - **Script:** one automation script per call, decoded from its exit status

pub mod helper;
pub mod native;
pub mod script;

pub use helper::HelperExecutor;
pub use native::NativeExecutor;
pub use script::{PowerShellScripts, ScriptBuilder, ScriptExecutor};
