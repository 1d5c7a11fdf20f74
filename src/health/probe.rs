//! Appliance health probing.
//!
//! # Responsibilities
//! - Scan the configured resource groups for the appliance pair
//! - Fetch each match's instance view and single attached interface
//! - Produce fresh ApplianceHealth records for the policy layer

use futures_util::future::join_all;

use crate::cloud::api::CloudApi;
use crate::cloud::types::CloudError;
use crate::config::schema::ApplianceConfig;
use crate::health::state::{latest_power_state, ApplianceHealth, ApplianceRole, HealthError};

/// Probe all configured resource groups, concurrently, and collect the
/// health of every appliance found. 0–2 entries; absence is not an error.
pub async fn probe_appliances(
    cloud: &dyn CloudApi,
    appliances: &ApplianceConfig,
) -> Result<Vec<ApplianceHealth>, HealthError> {
    let scans = appliances
        .resource_groups
        .iter()
        .map(|rg| probe_resource_group(cloud, appliances, rg));

    let mut found = Vec::new();
    for result in join_all(scans).await {
        found.extend(result?);
    }

    Ok(found)
}

async fn probe_resource_group(
    cloud: &dyn CloudApi,
    appliances: &ApplianceConfig,
    resource_group: &str,
) -> Result<Vec<ApplianceHealth>, HealthError> {
    let subscription = &appliances.subscription_id;
    let instances = cloud.list_virtual_machines(subscription, resource_group).await?;

    let mut found = Vec::new();
    for instance in instances {
        let role = if instance.name == appliances.primary {
            ApplianceRole::Primary
        } else if instance.name == appliances.secondary {
            ApplianceRole::Secondary
        } else {
            continue;
        };

        let vm = cloud
            .get_virtual_machine(subscription, resource_group, &instance.name)
            .await?;
        let properties = vm.properties.unwrap_or_default();

        let interfaces = properties
            .network_profile
            .map(|profile| profile.network_interfaces)
            .unwrap_or_default();
        if interfaces.len() > 1 {
            return Err(HealthError::MultipleInterfaces {
                appliance: vm.name,
                count: interfaces.len(),
            });
        }
        let Some(nic_ref) = interfaces.first() else {
            return Err(HealthError::MissingAddress { appliance: vm.name });
        };

        // The NIC's own id names its resource group; it is not necessarily
        // the group the instance was found in.
        let nic_group = nic_ref.resource_group().unwrap_or(resource_group);
        let nic_name = nic_ref
            .name()
            .ok_or(CloudError::MissingField("networkInterfaces.id"))?;

        let nic = cloud
            .get_network_interface(subscription, nic_group, nic_name)
            .await?;

        let private_ip = nic
            .properties
            .ip_configurations
            .first()
            .and_then(|ip| ip.properties.private_ip_address.as_deref())
            .and_then(|addr| addr.parse().ok())
            .ok_or_else(|| HealthError::MissingAddress {
                appliance: vm.name.clone(),
            })?;

        let status_label = properties
            .instance_view
            .as_ref()
            .and_then(|view| latest_power_state(&view.statuses))
            .unwrap_or_else(|| "unknown".to_string());

        tracing::debug!(
            appliance = %vm.name,
            role = %role,
            resource_group = %resource_group,
            private_ip = %private_ip,
            status = %status_label,
            "Probed appliance"
        );

        found.push(ApplianceHealth {
            name: vm.name,
            role,
            private_ip,
            status_label,
        });
    }

    Ok(found)
}
