//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the failover service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// The appliance pair under watch.
    pub appliances: ApplianceConfig,

    /// Which routes are managed, and where to look for them.
    pub routes: RouteSelectionConfig,

    /// Heartbeat and failover policy knobs.
    pub scheduler: SchedulerConfig,

    /// Management API endpoints, credentials and timeouts.
    pub cloud: CloudConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// The primary/secondary appliance pair.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ApplianceConfig {
    /// Instance name of the primary appliance.
    pub primary: String,

    /// Instance name of the secondary appliance.
    pub secondary: String,

    /// Subscription hosting both appliances.
    pub subscription_id: String,

    /// Resource groups scanned for the appliance instances.
    pub resource_groups: Vec<String>,
}

/// Route discovery scope and selection.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteSelectionConfig {
    /// Tag key a route table must carry to be eligible.
    pub tag_key: String,

    /// Route names managed inside each eligible table.
    pub route_names: Vec<String>,

    /// Additional subscriptions to scan. The appliance subscription is always
    /// included, whether listed here or not.
    pub subscriptions: Vec<String>,
}

impl RouteSelectionConfig {
    /// Discovery scope: configured subscriptions plus the appliance
    /// subscription, deduplicated, configured order preserved.
    pub fn effective_subscriptions(&self, appliance_subscription: &str) -> Vec<String> {
        let mut scope: Vec<String> = Vec::new();
        for sub in &self.subscriptions {
            if !sub.is_empty() && !scope.iter().any(|s| s == sub) {
                scope.push(sub.clone());
            }
        }
        if !scope.iter().any(|s| s == appliance_subscription) {
            scope.push(appliance_subscription.to_string());
        }
        scope
    }
}

/// Default heartbeat, also the fallback for invalid values.
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Heartbeat and failover policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between reconciliation cycles.
    pub heartbeat_secs: u64,

    /// When false every cycle is a no-op.
    pub enabled: bool,

    /// Fail traffic back to the primary as soon as it is healthy, even if the
    /// secondary currently in service is itself valid.
    pub preempt: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            heartbeat_secs: DEFAULT_HEARTBEAT_SECS,
            enabled: true,
            preempt: false,
        }
    }
}

/// Management API access.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Resource manager endpoint.
    pub endpoint: String,

    /// Token authority for the client-secret flow.
    pub authority: String,

    /// Client id of the user-assigned managed identity, when one is used.
    pub managed_identity_client_id: Option<String>,

    /// Timeout for individual management API requests in seconds.
    pub request_timeout_secs: u64,

    /// Upper bound on waiting for a single route update to reach a terminal
    /// state, in seconds.
    pub update_timeout_secs: u64,

    /// Interval between polls of a pending update operation, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://management.azure.com".to_string(),
            authority: "https://login.microsoftonline.com".to_string(),
            managed_identity_client_id: None,
            request_timeout_secs: 30,
            update_timeout_secs: 120,
            poll_interval_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON instead of human-readable lines.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
