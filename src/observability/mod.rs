//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout, JSON optional)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured logging with a cycle id threaded through every event
//! - Every warning/failure path carries enough fields to locate the object
//!   (subscription, resource group, table, route)
//! - Metrics are cheap (atomic updates) and never block the cycle

pub mod logging;
pub mod metrics;
