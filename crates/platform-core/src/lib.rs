//! GestureFlow platform core contracts.
//!
//! Display geometry and the low-level input-injection interface used by the
//! native executor tier, without coupling to a concrete OS backend.

use gestureflow_common::error::GestureflowResult;
use serde::{Deserialize, Serialize};

/// Information about a connected monitor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorInfo {
    /// Monitor name/identifier.
    pub name: String,
    /// Resolution in physical pixels.
    pub width: u32,
    pub height: u32,
    /// Position in the virtual desktop (pixels).
    pub x: i32,
    pub y: i32,
    /// Whether this monitor is primary.
    pub primary: bool,
}

/// Pixel dimensions of the display that receives cursor moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub const FALLBACK: DisplaySize = DisplaySize {
        width: 1920,
        height: 1080,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }
}

/// Display server / platform family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DisplayServer {
    Wayland,
    X11,
    Windows,
    MacOS,
    #[default]
    Unknown,
}

/// The active display: the primary monitor, else the first one, else the
/// fallback size.
pub fn active_display(monitors: &[MonitorInfo]) -> DisplaySize {
    monitors
        .iter()
        .find(|m| m.primary)
        .or_else(|| monitors.first())
        .map(|m| DisplaySize::new(m.width, m.height))
        .unwrap_or(DisplaySize::FALLBACK)
}

/// Scale normalized `[0.0, 1.0]` coordinates to rounded pixel coordinates.
pub fn denormalize_coords(norm_x: f64, norm_y: f64, size: DisplaySize) -> (i32, i32) {
    let x = (norm_x.clamp(0.0, 1.0) * size.width as f64).round() as i32;
    let y = (norm_y.clamp(0.0, 1.0) * size.height as f64).round() as i32;
    (x, y)
}

/// Low-level input injection (tier 1 executor backend).
///
/// Implementations talk to the OS input stack directly, so every call is
/// expected to be fast and non-blocking.
pub trait InputInjector: Send {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Size of the display cursor coordinates are expressed against.
    fn display(&self) -> DisplaySize;

    /// Warp the cursor to absolute pixel coordinates.
    fn move_cursor(&mut self, x: i32, y: i32) -> GestureflowResult<()>;

    /// Hold Ctrl and scroll `notches` wheel steps (positive = up/zoom in).
    fn ctrl_wheel(&mut self, notches: i32) -> GestureflowResult<()>;
}

/// Wheel notches for a signed zoom delta: at least one, otherwise the
/// rounded magnitude, carrying the sign of `delta`.
pub fn wheel_notches(delta: f64) -> i32 {
    let steps = if delta.abs() < 1.0 {
        1
    } else {
        delta.abs().round() as i32
    };
    if delta < 0.0 {
        -steps
    } else {
        steps
    }
}
