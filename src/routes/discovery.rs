//! Route discovery across subscriptions.
//!
//! # Responsibilities
//! - Enumerate resource groups and route tables per subscription
//! - Keep tables carrying the configured tag key
//! - Fetch each managed route name from every eligible table
//!
//! Read-only; nothing here mutates.

use futures_util::future::join_all;

use crate::cloud::api::{CloudApi, RouteTarget};
use crate::cloud::types::{CloudError, CloudResult};
use crate::config::schema::RouteSelectionConfig;
use crate::routes::record::RouteRecord;

/// Discover every managed route in the given subscriptions, concurrently
/// per subscription. A configured route name absent from a tagged table is
/// a warning, not an error; any other API failure aborts discovery.
pub async fn discover_routes(
    cloud: &dyn CloudApi,
    selection: &RouteSelectionConfig,
    subscriptions: &[String],
) -> CloudResult<Vec<RouteRecord>> {
    let scans = subscriptions
        .iter()
        .map(|sub| discover_subscription(cloud, selection, sub));

    let mut records = Vec::new();
    for result in join_all(scans).await {
        records.extend(result?);
    }

    Ok(records)
}

async fn discover_subscription(
    cloud: &dyn CloudApi,
    selection: &RouteSelectionConfig,
    subscription: &str,
) -> CloudResult<Vec<RouteRecord>> {
    let mut records = Vec::new();

    for resource_group in cloud.list_resource_groups(subscription).await? {
        let tables = cloud.list_route_tables(subscription, &resource_group).await?;

        for table in tables {
            if !table.has_tag(&selection.tag_key) {
                continue;
            }

            for route_name in &selection.route_names {
                let route = match cloud
                    .get_route(subscription, &resource_group, &table.name, route_name)
                    .await
                {
                    Ok(route) => route,
                    Err(CloudError::NotFound) => {
                        tracing::warn!(
                            subscription = %subscription,
                            resource_group = %resource_group,
                            route_table = %table.name,
                            route = %route_name,
                            "Route name not found in tagged table, skipping"
                        );
                        continue;
                    }
                    Err(e) => return Err(e),
                };

                records.push(RouteRecord {
                    target: RouteTarget {
                        subscription_id: subscription.to_string(),
                        resource_group: resource_group.clone(),
                        route_table: table.name.clone(),
                        route_name: route_name.clone(),
                    },
                    route,
                });
            }
        }
    }

    Ok(records)
}
