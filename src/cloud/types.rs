//! Wire types and error definitions for the management API.
//!
//! Shapes follow the resource manager's JSON (camelCase, `value`/`nextLink`
//! paging envelopes). Only the fields this service reads are modeled.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the management API boundary.
#[derive(Debug, Error)]
pub enum CloudError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("management API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Credential acquisition failed.
    #[error("credential acquisition failed: {0}")]
    Auth(String),

    /// The requested resource does not exist.
    #[error("resource not found")]
    NotFound,

    /// Response body did not match the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Response was well-formed but missing a field this service needs.
    #[error("response missing expected field: {0}")]
    MissingField(&'static str),

    /// Endpoint or link URL could not be constructed.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for management API operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Terminal (or not) state of an asynchronous management operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    Succeeded,
    Failed,
    Canceled,
    /// Any other label the API reports, e.g. `InProgress`.
    Other(String),
}

impl OperationStatus {
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("succeeded") {
            OperationStatus::Succeeded
        } else if label.eq_ignore_ascii_case("failed") {
            OperationStatus::Failed
        } else if label.eq_ignore_ascii_case("canceled") || label.eq_ignore_ascii_case("cancelled")
        {
            OperationStatus::Canceled
        } else {
            OperationStatus::Other(label.to_string())
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::Other(_))
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationStatus::Succeeded)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationStatus::Succeeded => write!(f, "Succeeded"),
            OperationStatus::Failed => write!(f, "Failed"),
            OperationStatus::Canceled => write!(f, "Canceled"),
            OperationStatus::Other(label) => write!(f, "{}", label),
        }
    }
}

/// One page of a paged list response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListPage<T> {
    #[serde(default)]
    pub value: Vec<T>,
    pub next_link: Option<String>,
}

/// Reference to another resource by id.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResourceRef {
    pub id: String,
}

impl ResourceRef {
    /// Last path segment of the resource id.
    pub fn name(&self) -> Option<&str> {
        self.id.rsplit('/').next().filter(|s| !s.is_empty())
    }

    /// The `resourceGroups/<name>` segment of the resource id.
    pub fn resource_group(&self) -> Option<&str> {
        let mut segments = self.id.split('/');
        while let Some(segment) = segments.next() {
            if segment.eq_ignore_ascii_case("resourcegroups") {
                return segments.next().filter(|s| !s.is_empty());
            }
        }
        None
    }
}

/// A compute instance, optionally expanded with its instance view.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    pub name: String,
    #[serde(default)]
    pub properties: Option<VmProperties>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmProperties {
    pub instance_view: Option<InstanceView>,
    pub network_profile: Option<NetworkProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceView {
    #[serde(default)]
    pub statuses: Vec<InstanceStatus>,
}

/// One status record from the instance view.
///
/// The `time` field is optional on the wire; when present it is the only
/// reliable signal of recency and callers must prefer it over record order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStatus {
    pub code: Option<String>,
    pub display_status: Option<String>,
    pub time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default)]
    pub network_interfaces: Vec<ResourceRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterface {
    pub name: String,
    #[serde(default)]
    pub properties: NicProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NicProperties {
    #[serde(default)]
    pub ip_configurations: Vec<IpConfiguration>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfiguration {
    #[serde(default)]
    pub properties: IpConfigurationProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpConfigurationProperties {
    pub private_ip_address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceGroup {
    pub name: String,
}

/// A route table with its tag set.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteTable {
    pub name: String,
    #[serde(default)]
    pub tags: Option<HashMap<String, String>>,
}

impl RouteTable {
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.as_ref().is_some_and(|tags| tags.contains_key(key))
    }
}

/// A single route within a route table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub properties: RouteProperties,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_hop_ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}
