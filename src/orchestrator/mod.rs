//! Cycle orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! Heartbeat tick
//!     → cycle.rs: probe → policy → discovery → reconcile
//!     → CycleReport (or CycleError, aborting before any mutation)
//! ```
//!
//! # Design Decisions
//! - Fatal health/policy errors short-circuit the cycle before discovery,
//!   so routes are never mutated under ambiguous health
//! - Per-route failures are contained by the reconciler and reported, not
//!   raised
//! - Each cycle is a fresh idempotent re-evaluation; no state crosses cycles

pub mod cycle;

pub use cycle::{CycleError, CycleReport, Orchestrator};
