//! Appliance health subsystem.
//!
//! # Data Flow
//! ```text
//! Probe (probe.rs):
//!     Scan configured resource groups
//!     → Match instances against the configured primary/secondary names
//!     → Fetch instance view + the single attached interface
//!     → Build ApplianceHealth records (state.rs)
//!
//! State (state.rs):
//!     Status records → latest power state, by timestamp when available
//! ```
//!
//! # Design Decisions
//! - Health is read fresh every cycle; nothing persists between heartbeats
//! - An appliance with more than one interface is a fatal config error,
//!   not something to guess around
//! - An appliance absent from the scanned groups is omitted, not an error;
//!   the policy layer decides what an incomplete pair means

pub mod probe;
pub mod state;

pub use probe::probe_appliances;
pub use state::{ApplianceHealth, ApplianceRole, HealthError};
