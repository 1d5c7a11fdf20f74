//! Per-route update outcome.

use crate::cloud::api::PendingRouteUpdate;

/// State of one route's mutation within a cycle, advanced by the
/// reconciler: decide → submit (`Pending`) → await (`Succeeded`/`Failed`).
/// Discarded when the cycle ends.
pub enum UpdateOutcome {
    /// The route's current next hop was already valid; nothing submitted.
    NotAttempted,
    /// Mutation submitted, terminal state not yet observed.
    Pending(Box<dyn PendingRouteUpdate>),
    /// Mutation reached a successful terminal state.
    Succeeded,
    /// Submission was rejected or the terminal state was not success.
    Failed(String),
}

impl UpdateOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            UpdateOutcome::NotAttempted => "skipped",
            UpdateOutcome::Pending(_) => "pending",
            UpdateOutcome::Succeeded => "succeeded",
            UpdateOutcome::Failed(_) => "failed",
        }
    }
}

impl std::fmt::Debug for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOutcome::NotAttempted => write!(f, "NotAttempted"),
            UpdateOutcome::Pending(_) => write!(f, "Pending(..)"),
            UpdateOutcome::Succeeded => write!(f, "Succeeded"),
            UpdateOutcome::Failed(reason) => write!(f, "Failed({:?})", reason),
        }
    }
}
