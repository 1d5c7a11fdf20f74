//! Shared fixtures for cycle integration tests: an in-memory cloud with
//! programmable update behavior and call accounting.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use nva_failover::cloud::api::{CloudApi, PendingRouteUpdate, RouteTarget};
use nva_failover::cloud::types::{
    CloudError, CloudResult, InstanceStatus, InstanceView, IpConfiguration,
    IpConfigurationProperties, NetworkInterface, NetworkProfile, NicProperties, OperationStatus,
    ResourceRef, Route, RouteProperties, RouteTable, VirtualMachine, VmProperties,
};
use nva_failover::config::schema::{AppConfig, ApplianceConfig, RouteSelectionConfig};

pub const TAG_KEY: &str = "nva-managed";

/// How the mock resolves a submitted route update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateBehavior {
    /// Accept and reach the Succeeded terminal state.
    Succeed,
    /// Accept but terminate as Failed.
    TerminalFailed,
    /// Reject the submission itself.
    RejectSubmit,
    /// Accept and never reach a terminal state.
    Hang,
}

#[derive(Default)]
struct MockState {
    /// subscription → resource groups
    resource_groups: HashMap<String, Vec<String>>,
    /// (subscription, rg) → instances
    vms: HashMap<(String, String), Vec<VirtualMachine>>,
    /// (subscription, rg, name) → interface
    nics: HashMap<(String, String, String), NetworkInterface>,
    /// (subscription, rg) → tables
    route_tables: HashMap<(String, String), Vec<RouteTable>>,
    /// (subscription, rg, table, route) → route
    routes: HashMap<(String, String, String, String), Route>,
    /// (table, route) → behavior, default Succeed
    behaviors: HashMap<(String, String), UpdateBehavior>,
}

/// In-memory `CloudApi` with programmable fixtures.
pub struct MockCloud {
    state: Mutex<MockState>,
    /// Updates submitted, in submission order: (target, next hop written).
    pub submitted: Mutex<Vec<(RouteTarget, String)>>,
    probe_calls: AtomicUsize,
    discovery_calls: AtomicUsize,
    submit_calls: AtomicUsize,
}

impl MockCloud {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            submitted: Mutex::new(Vec::new()),
            probe_calls: AtomicUsize::new(0),
            discovery_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
        }
    }

    pub fn add_resource_group(&self, subscription: &str, rg: &str) {
        let mut state = self.state.lock().unwrap();
        let groups = state.resource_groups.entry(subscription.into()).or_default();
        if !groups.iter().any(|g| g == rg) {
            groups.push(rg.into());
        }
    }

    /// Register an appliance instance with one NIC and a power state.
    pub fn add_appliance(&self, subscription: &str, rg: &str, name: &str, ip: &str, power: &str) {
        self.add_resource_group(subscription, rg);

        let nic_id = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/networkInterfaces/{}-nic",
            subscription, rg, name
        );

        let vm = VirtualMachine {
            name: name.into(),
            properties: Some(VmProperties {
                instance_view: Some(InstanceView {
                    statuses: vec![
                        InstanceStatus {
                            code: Some("ProvisioningState/succeeded".into()),
                            display_status: Some("Provisioning succeeded".into()),
                            time: Some(Utc::now()),
                        },
                        InstanceStatus {
                            code: Some(format!("PowerState/{}", power)),
                            display_status: Some(format!("VM {}", power)),
                            time: Some(Utc::now()),
                        },
                    ],
                }),
                network_profile: Some(NetworkProfile {
                    network_interfaces: vec![ResourceRef { id: nic_id }],
                }),
            }),
        };

        let nic = NetworkInterface {
            name: format!("{}-nic", name),
            properties: NicProperties {
                ip_configurations: vec![IpConfiguration {
                    properties: IpConfigurationProperties {
                        private_ip_address: Some(ip.into()),
                    },
                }],
            },
        };

        let mut state = self.state.lock().unwrap();
        state
            .vms
            .entry((subscription.into(), rg.into()))
            .or_default()
            .push(vm);
        state
            .nics
            .insert((subscription.into(), rg.into(), format!("{}-nic", name)), nic);
    }

    /// Register an instance with the given number of NIC references.
    pub fn add_vm_with_nics(&self, subscription: &str, rg: &str, name: &str, nic_count: usize) {
        self.add_resource_group(subscription, rg);

        let refs = (0..nic_count)
            .map(|i| ResourceRef {
                id: format!(
                    "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/networkInterfaces/{}-nic-{}",
                    subscription, rg, name, i
                ),
            })
            .collect();

        let vm = VirtualMachine {
            name: name.into(),
            properties: Some(VmProperties {
                instance_view: Some(InstanceView { statuses: vec![] }),
                network_profile: Some(NetworkProfile {
                    network_interfaces: refs,
                }),
            }),
        };

        let mut state = self.state.lock().unwrap();
        state
            .vms
            .entry((subscription.into(), rg.into()))
            .or_default()
            .push(vm);
    }

    pub fn add_route_table(&self, subscription: &str, rg: &str, table: &str, tagged: bool) {
        self.add_resource_group(subscription, rg);

        let tags = tagged.then(|| {
            let mut tags = HashMap::new();
            tags.insert(TAG_KEY.to_string(), "true".to_string());
            tags
        });

        let mut state = self.state.lock().unwrap();
        state
            .route_tables
            .entry((subscription.into(), rg.into()))
            .or_default()
            .push(RouteTable {
                name: table.into(),
                tags,
            });
    }

    pub fn add_route(&self, subscription: &str, rg: &str, table: &str, route: &str, next_hop: &str) {
        let mut state = self.state.lock().unwrap();
        state.routes.insert(
            (subscription.into(), rg.into(), table.into(), route.into()),
            Route {
                id: Some(format!(
                    "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/routeTables/{}/routes/{}",
                    subscription, rg, table, route
                )),
                name: route.into(),
                properties: RouteProperties {
                    address_prefix: Some("0.0.0.0/0".into()),
                    next_hop_type: Some("VirtualAppliance".into()),
                    next_hop_ip_address: Some(next_hop.into()),
                    provisioning_state: Some("Succeeded".into()),
                },
            },
        );
    }

    pub fn set_update_behavior(&self, table: &str, route: &str, behavior: UpdateBehavior) {
        let mut state = self.state.lock().unwrap();
        state.behaviors.insert((table.into(), route.into()), behavior);
    }

    pub fn probe_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Next hops written, in submission order.
    pub fn submitted_next_hops(&self) -> Vec<String> {
        self.submitted.lock().unwrap().iter().map(|(_, hop)| hop.clone()).collect()
    }
}

struct MockPending {
    behavior: UpdateBehavior,
}

#[async_trait]
impl PendingRouteUpdate for MockPending {
    async fn wait(self: Box<Self>) -> CloudResult<OperationStatus> {
        match self.behavior {
            UpdateBehavior::Succeed => Ok(OperationStatus::Succeeded),
            UpdateBehavior::TerminalFailed => Ok(OperationStatus::Failed),
            UpdateBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            UpdateBehavior::RejectSubmit => unreachable!("rejected at submission"),
        }
    }
}

#[async_trait]
impl CloudApi for MockCloud {
    async fn list_virtual_machines(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<VirtualMachine>> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .vms
            .get(&(subscription.into(), resource_group.into()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            // The list call carries names only; the expanded view comes from
            // the get call.
            .map(|vm| VirtualMachine {
                name: vm.name,
                properties: None,
            })
            .collect())
    }

    async fn get_virtual_machine(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<VirtualMachine> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state
            .vms
            .get(&(subscription.into(), resource_group.into()))
            .and_then(|vms| vms.iter().find(|vm| vm.name == name))
            .cloned()
            .ok_or(CloudError::NotFound)
    }

    async fn get_network_interface(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<NetworkInterface> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state
            .nics
            .get(&(subscription.into(), resource_group.into(), name.into()))
            .cloned()
            .ok_or(CloudError::NotFound)
    }

    async fn list_resource_groups(&self, subscription: &str) -> CloudResult<Vec<String>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .resource_groups
            .get(subscription)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_route_tables(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<RouteTable>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        Ok(state
            .route_tables
            .get(&(subscription.into(), resource_group.into()))
            .cloned()
            .unwrap_or_default())
    }

    async fn get_route(
        &self,
        subscription: &str,
        resource_group: &str,
        route_table: &str,
        route_name: &str,
    ) -> CloudResult<Route> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        state
            .routes
            .get(&(
                subscription.into(),
                resource_group.into(),
                route_table.into(),
                route_name.into(),
            ))
            .cloned()
            .ok_or(CloudError::NotFound)
    }

    async fn begin_update_route(
        &self,
        target: &RouteTarget,
        route: Route,
    ) -> CloudResult<Box<dyn PendingRouteUpdate>> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let behavior = {
            let state = self.state.lock().unwrap();
            state
                .behaviors
                .get(&(target.route_table.clone(), target.route_name.clone()))
                .copied()
                .unwrap_or(UpdateBehavior::Succeed)
        };

        if behavior == UpdateBehavior::RejectSubmit {
            return Err(CloudError::Api {
                status: 409,
                message: "update rejected".into(),
            });
        }

        self.submitted.lock().unwrap().push((
            target.clone(),
            route.properties.next_hop_ip_address.clone().unwrap_or_default(),
        ));

        Ok(Box::new(MockPending { behavior }))
    }
}

/// A minimal valid config for the standard two-appliance fixture.
pub fn test_config() -> AppConfig {
    AppConfig {
        appliances: ApplianceConfig {
            primary: "nva-a".into(),
            secondary: "nva-b".into(),
            subscription_id: "sub-a".into(),
            resource_groups: vec!["rg-nva".into()],
        },
        routes: RouteSelectionConfig {
            tag_key: TAG_KEY.into(),
            route_names: vec!["default".into()],
            subscriptions: vec![],
        },
        ..Default::default()
    }
}
