//! Failover decision subsystem.
//!
//! # Data Flow
//! ```text
//! ApplianceHealth (exactly two, or the cycle dies here)
//!     → policy.rs (priority order: primary, then secondary)
//!     → NextHopList (non-empty, primary first when both healthy)
//! ```
//!
//! # Design Decisions
//! - Any appliance count other than two is a topology mismatch, never
//!   something to work around silently
//! - Zero healthy appliances is a total outage; the service refuses to pick
//!   a next hop rather than invent one

pub mod policy;

pub use policy::{select_next_hops, NextHopList};
