//! Trait seam between the decision logic and the management API.
//!
//! The probe, discovery and reconciler components only ever see these traits.
//! Production wires in [`crate::cloud::arm::ArmClient`]; tests substitute an
//! in-memory implementation.

use async_trait::async_trait;

use crate::cloud::types::{
    CloudResult, NetworkInterface, OperationStatus, Route, RouteTable, VirtualMachine,
};

/// Fully-qualified address of a single route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteTarget {
    pub subscription_id: String,
    pub resource_group: String,
    pub route_table: String,
    pub route_name: String,
}

impl std::fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.subscription_id, self.route_table, self.route_name)
    }
}

/// Read and mutate operations this service needs from the platform.
///
/// One instance spans all subscriptions; every method takes the subscription
/// id explicitly. All reads are snapshot-style: nothing is cached between
/// cycles.
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Instances in a resource group, names only (no instance view).
    async fn list_virtual_machines(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<VirtualMachine>>;

    /// A single instance expanded with its instance view and NIC references.
    async fn get_virtual_machine(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<VirtualMachine>;

    async fn get_network_interface(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<NetworkInterface>;

    async fn list_resource_groups(&self, subscription: &str) -> CloudResult<Vec<String>>;

    async fn list_route_tables(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<RouteTable>>;

    /// A single route; `CloudError::NotFound` when the name is absent from
    /// the table.
    async fn get_route(
        &self,
        subscription: &str,
        resource_group: &str,
        route_table: &str,
        route_name: &str,
    ) -> CloudResult<Route>;

    /// Submit a route mutation without waiting for it to complete.
    ///
    /// The returned handle owns the in-flight operation; dropping it without
    /// calling `wait` abandons tracking but never cancels the mutation.
    async fn begin_update_route(
        &self,
        target: &RouteTarget,
        route: Route,
    ) -> CloudResult<Box<dyn PendingRouteUpdate>>;
}

/// An in-flight route mutation, advanced to a terminal state by `wait`.
#[async_trait]
pub trait PendingRouteUpdate: Send {
    async fn wait(self: Box<Self>) -> CloudResult<OperationStatus>;
}
