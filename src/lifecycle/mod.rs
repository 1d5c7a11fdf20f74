//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Heartbeat (heartbeat.rs):
//!     Interval tick → run one cycle → log report or abort error → next tick
//!     Ticks are consumed inside the loop body, so cycles never overlap.
//!
//! Shutdown (shutdown.rs):
//!     Signal received → broadcast → heartbeat loop exits after the
//!     in-flight cycle completes
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - A cycle runs to natural completion; there is no mid-cycle cancellation
//! - Fatal cycle errors never stop the schedule; only signals do

pub mod heartbeat;
pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
