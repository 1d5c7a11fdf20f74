//! NVA Route Failover Library
//!
//! Active/standby failover for a pair of network virtual appliances: probe
//! appliance health, derive the valid next hops, and reconcile tagged routes
//! across subscriptions on a fixed heartbeat.

pub mod cloud;
pub mod config;
pub mod failover;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod routes;

pub use config::schema::AppConfig;
pub use lifecycle::Shutdown;
pub use orchestrator::Orchestrator;
