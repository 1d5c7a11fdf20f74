//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → config file (TOML, optional)
//!     → environment variables (override)
//!     → loader.rs (merge & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is resolved exactly once at startup; no component reads process
//!   environment directly afterwards
//! - Environment variable names (NVA_PRIMARY, ROUTE_TAG, ...) are the ones
//!   existing deployments already set, so they carry over
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigError;
pub use schema::AppConfig;
pub use schema::ApplianceConfig;
pub use schema::CloudConfig;
pub use schema::ObservabilityConfig;
pub use schema::RouteSelectionConfig;
pub use schema::SchedulerConfig;
