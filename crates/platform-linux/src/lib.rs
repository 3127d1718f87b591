//! GestureFlow Linux Platform Integration
//!
//! Platform-specific implementations for Linux:
//! - **Display Detection:** Monitor enumeration for cursor scaling
//! - **uinput:** Virtual pointer for cursor warps and Ctrl+wheel zoom
//! - **Permissions:** Capability detection and user guidance

pub mod display;
pub mod permissions;
pub mod uinput;

pub use display::*;
pub use uinput::UinputInjector;
