//! Executor abstraction shared by all tiers.

use async_trait::async_trait;
use gestureflow_common::error::GestureflowResult;

use crate::action::{ActionClass, TargetAction};

/// Executor tiers in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Low-level input injection in-process.
    Native,
    /// Persistent helper process fed one command per line.
    Helper,
    /// One-shot automation script per call.
    Script,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Helper => "helper",
            Self::Script => "script",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to an action that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Performed and confirmed.
    Executed,
    /// Handed to the helper process; no completion is reported back.
    Forwarded,
    /// No presentation host is running.
    NoHostInstance,
    /// The host is running but has no document loaded.
    NoDocument,
    /// The host has a document but no slide show is running.
    NoActiveSession,
}

impl ActionOutcome {
    /// Host-state conditions that are reported, not treated as failures.
    pub fn is_host_condition(&self) -> bool {
        matches!(
            self,
            Self::NoHostInstance | Self::NoDocument | Self::NoActiveSession
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Executed => "executed",
            Self::Forwarded => "forwarded",
            Self::NoHostInstance => "no host instance",
            Self::NoDocument => "no document",
            Self::NoActiveSession => "no active session",
        }
    }
}

impl std::fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An execution backend. Shared across concurrently running actions.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    fn tier(&self) -> Tier;

    /// Whether this backend can perform actions of `class`.
    fn supports(&self, class: ActionClass) -> bool;

    async fn execute(&self, action: &TargetAction) -> GestureflowResult<ActionOutcome>;

    /// Release external resources. Called once when the dispatcher stops.
    async fn shutdown(&self) {}
}
