//! Route discovery and reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Discovery (discovery.rs):
//!     Subscriptions → resource groups → route tables
//!     → keep tables carrying the configured tag
//!     → fetch each managed route name (absent name: warn + skip)
//!     → RouteRecord list (record.rs)
//!
//! Reconciliation (reconciler.rs):
//!     Per-route decision against the NextHopList
//!     → phase 1: submit every planned mutation, collect pending handles
//!     → phase 2: await each handle to a terminal state
//!     → per-route UpdateOutcome (outcome.rs)
//! ```
//!
//! # Design Decisions
//! - Routes are decided independently; there is no cross-route state
//! - A failure on one route never cancels, blocks or rolls back another
//! - No retry inside a cycle; the next heartbeat re-evaluates the world

pub mod discovery;
pub mod outcome;
pub mod reconciler;
pub mod record;

pub use discovery::discover_routes;
pub use outcome::UpdateOutcome;
pub use reconciler::{decide, reconcile_routes, ReconcileReport, RouteDecision};
pub use record::RouteRecord;
