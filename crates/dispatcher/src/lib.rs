//! GestureFlow Dispatcher
//!
//! Receives action messages and turns them into OS actions. Each message is
//! mapped through a fixed table to a [`TargetAction`] and executed on its
//! own task by the backend resolved for its [`ActionClass`] at startup:
//!
//! | tier | backend | used for |
//! |---|---|---|
//! | 1 | native input injection | cursor moves, Ctrl+wheel zoom |
//! | 2 | persistent helper process | everything |
//! | 3 | one-shot automation script | everything |
//!
//! A failed call is logged and dropped unless escalation is enabled.

pub mod action;
pub mod backends;
pub mod executor;
pub mod service;
pub mod tiers;

pub use action::{map_message, ActionClass, TargetAction};
pub use executor::{ActionExecutor, ActionOutcome, Tier};
pub use service::{resolve_display, serve, DispatchStats, Dispatcher};
pub use tiers::TierRoutes;
