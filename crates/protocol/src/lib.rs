//! GestureFlow Protocol
//!
//! Defines the data contracts shared by recognition and dispatch:
//! - **Landmarks:** The 21-point hand pose delivered per frame
//! - **Gestures:** Labels and the per-frame observation record
//! - **Messages:** Line-delimited JSON carried over the transport
//! - **Helper commands:** Line-delimited JSON written to the helper process
//!
//! All planar coordinates are normalized to `[0.0, 1.0]`.

pub mod gesture;
pub mod helper;
pub mod landmark;
pub mod message;

pub use gesture::*;
pub use helper::*;
pub use landmark::*;
pub use message::*;
