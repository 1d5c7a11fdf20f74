//! Appliance health records and power-state interpretation.

use std::net::IpAddr;

use thiserror::Error;

use crate::cloud::types::{CloudError, InstanceStatus};

/// The label an instance must report to be a valid next hop.
pub const RUNNING_LABEL: &str = "running";

/// Position of an appliance in the failover pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceRole {
    Primary,
    Secondary,
}

impl std::fmt::Display for ApplianceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplianceRole::Primary => write!(f, "primary"),
            ApplianceRole::Secondary => write!(f, "secondary"),
        }
    }
}

/// Health snapshot of one appliance, built fresh each cycle.
#[derive(Debug, Clone)]
pub struct ApplianceHealth {
    pub name: String,
    pub role: ApplianceRole,
    pub private_ip: IpAddr,
    pub status_label: String,
}

impl ApplianceHealth {
    pub fn is_running(&self) -> bool {
        self.status_label.eq_ignore_ascii_case(RUNNING_LABEL)
    }
}

/// Fatal health conditions; any of these aborts the cycle before mutation.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("expected exactly 2 appliances, found {0}")]
    WrongApplianceCount(usize),

    #[error("appliance {appliance} has {count} network interfaces, expected exactly one")]
    MultipleInterfaces { appliance: String, count: usize },

    #[error("appliance {appliance} reports no usable private address")]
    MissingAddress { appliance: String },

    #[error("no running appliance available")]
    NoHealthyAppliance,

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

/// The current power state of an instance, from its status records.
///
/// Records are matched by their `PowerState/<label>` code; the newest
/// timestamp wins when timestamps are reported, otherwise the last record is
/// taken on the documented contract that the provider appends chronologically.
pub fn latest_power_state(statuses: &[InstanceStatus]) -> Option<String> {
    let power: Vec<&InstanceStatus> = statuses
        .iter()
        .filter(|s| s.code.as_deref().and_then(power_state_suffix).is_some())
        .collect();

    // Some providers omit codes; fall back to every record.
    let candidates: Vec<&InstanceStatus> = if power.is_empty() {
        statuses.iter().collect()
    } else {
        power
    };

    let chosen = if candidates.iter().any(|s| s.time.is_some()) {
        candidates
            .iter()
            .filter(|s| s.time.is_some())
            .max_by_key(|s| s.time)
            .copied()
    } else {
        candidates.last().copied()
    };

    chosen.and_then(record_label)
}

/// Normalized lowercase label for one status record.
///
/// Prefers the `PowerState/running` code suffix; display strings such as
/// `VM running` have the `vm ` prefix dropped so both spellings compare equal.
fn record_label(status: &InstanceStatus) -> Option<String> {
    if let Some(suffix) = status.code.as_deref().and_then(power_state_suffix) {
        return Some(suffix.to_ascii_lowercase());
    }

    status.display_status.as_deref().map(|display| {
        let lower = display.to_ascii_lowercase();
        lower.strip_prefix("vm ").map(str::to_string).unwrap_or(lower)
    })
}

/// The `<label>` part of a `PowerState/<label>` code, case-insensitively.
fn power_state_suffix(code: &str) -> Option<&str> {
    let prefix = code.get(..11)?;
    if !prefix.eq_ignore_ascii_case("powerstate/") {
        return None;
    }
    code.get(11..).filter(|s| !s.is_empty())
}
