//! Cloud management API subsystem.
//!
//! # Data Flow
//! ```text
//! Environment / config (tenant, client id, managed identity)
//!     → auth.rs (token acquisition with caching)
//!     → arm.rs (REST client with timeouts, paging, async operations)
//!     → api.rs (trait seam consumed by probe/discovery/reconciler)
//! ```
//!
//! # Design Decisions
//! - Everything above this module talks to `CloudApi`, never to REST directly
//! - One client instance spans all subscriptions; methods take the
//!   subscription id
//! - Route mutation is split into submit (returns a pending handle) and wait
//!   (polls to a terminal state), mirroring the two-phase reconciler
//! - All calls have configurable timeouts; no call retries on its own

pub mod api;
pub mod arm;
pub mod auth;
pub mod types;

pub use api::{CloudApi, PendingRouteUpdate, RouteTarget};
pub use arm::ArmClient;
pub use auth::TokenCredential;
pub use types::{CloudError, CloudResult, OperationStatus};
