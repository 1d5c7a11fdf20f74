//! REST client for the resource manager API.
//!
//! # Responsibilities
//! - Authenticated GET/PUT with per-request timeouts
//! - Follow `nextLink` paging transparently
//! - Track asynchronous route mutations via the operation-monitor header,
//!   falling back to the route's provisioning state
//!
//! # Design Decisions
//! - No retries here: a failed call surfaces immediately and the cycle logic
//!   decides what is fatal
//! - `begin_update_route` returns after the PUT is accepted; polling happens
//!   only when the caller awaits the pending handle

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::time::sleep;
use url::Url;

use crate::cloud::api::{CloudApi, PendingRouteUpdate, RouteTarget};
use crate::cloud::auth::TokenCredential;
use crate::cloud::types::{
    CloudError, CloudResult, ListPage, NetworkInterface, OperationStatus, ResourceGroup, Route,
    RouteTable, VirtualMachine,
};
use crate::config::schema::CloudConfig;

const COMPUTE_API_VERSION: &str = "2022-03-01";
const NETWORK_API_VERSION: &str = "2022-07-01";
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// Client for one resource manager endpoint, spanning all subscriptions.
pub struct ArmClient {
    http: reqwest::Client,
    credential: Arc<TokenCredential>,
    endpoint: Url,
    poll_interval: Duration,
}

impl ArmClient {
    pub fn new(config: &CloudConfig, credential: TokenCredential) -> CloudResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            credential: Arc::new(credential),
            endpoint: Url::parse(&config.endpoint)?,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
        })
    }

    fn resource_url(&self, path: &str, api_version: &str) -> CloudResult<Url> {
        let mut url = self.endpoint.join(path)?;
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> CloudResult<T> {
        get_json(&self.http, &self.credential, url).await
    }

    async fn get_paged<T: DeserializeOwned>(&self, first: Url) -> CloudResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);

        while let Some(url) = next {
            let page: ListPage<T> = self.get_json(url).await?;
            items.extend(page.value);
            next = match page.next_link {
                Some(link) => Some(Url::parse(&link)?),
                None => None,
            };
        }

        Ok(items)
    }
}

#[async_trait]
impl CloudApi for ArmClient {
    async fn list_virtual_machines(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<VirtualMachine>> {
        let url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachines",
                subscription, resource_group
            ),
            COMPUTE_API_VERSION,
        )?;
        self.get_paged(url).await
    }

    async fn get_virtual_machine(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<VirtualMachine> {
        let mut url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Compute/virtualMachines/{}",
                subscription, resource_group, name
            ),
            COMPUTE_API_VERSION,
        )?;
        url.query_pairs_mut().append_pair("$expand", "instanceView");
        self.get_json(url).await
    }

    async fn get_network_interface(
        &self,
        subscription: &str,
        resource_group: &str,
        name: &str,
    ) -> CloudResult<NetworkInterface> {
        let url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/networkInterfaces/{}",
                subscription, resource_group, name
            ),
            NETWORK_API_VERSION,
        )?;
        self.get_json(url).await
    }

    async fn list_resource_groups(&self, subscription: &str) -> CloudResult<Vec<String>> {
        let url = self.resource_url(
            &format!("/subscriptions/{}/resourcegroups", subscription),
            RESOURCES_API_VERSION,
        )?;
        let groups: Vec<ResourceGroup> = self.get_paged(url).await?;
        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    async fn list_route_tables(
        &self,
        subscription: &str,
        resource_group: &str,
    ) -> CloudResult<Vec<RouteTable>> {
        let url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/routeTables",
                subscription, resource_group
            ),
            NETWORK_API_VERSION,
        )?;
        self.get_paged(url).await
    }

    async fn get_route(
        &self,
        subscription: &str,
        resource_group: &str,
        route_table: &str,
        route_name: &str,
    ) -> CloudResult<Route> {
        let url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/routeTables/{}/routes/{}",
                subscription, resource_group, route_table, route_name
            ),
            NETWORK_API_VERSION,
        )?;
        self.get_json(url).await
    }

    async fn begin_update_route(
        &self,
        target: &RouteTarget,
        route: Route,
    ) -> CloudResult<Box<dyn PendingRouteUpdate>> {
        let url = self.resource_url(
            &format!(
                "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/routeTables/{}/routes/{}",
                target.subscription_id, target.resource_group, target.route_table, target.route_name
            ),
            NETWORK_API_VERSION,
        )?;

        let token = self.credential.bearer_token(&self.http).await?;
        let response = self
            .http
            .put(url.clone())
            .bearer_auth(token)
            .json(&route)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CloudError::Api {
                status: status.as_u16(),
                message: clip(&message),
            });
        }

        // The operation monitor header points at the async-operation status
        // resource; without it the route's provisioningState is polled.
        let monitor = response
            .headers()
            .get("azure-asyncoperation")
            .or_else(|| response.headers().get("location"))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Url::parse(v).ok());

        let poll_interval = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(self.poll_interval);

        Ok(Box::new(ArmPendingUpdate {
            http: self.http.clone(),
            credential: self.credential.clone(),
            monitor,
            route_url: url,
            poll_interval,
        }))
    }
}

/// An accepted route mutation being tracked to its terminal state.
struct ArmPendingUpdate {
    http: reqwest::Client,
    credential: Arc<TokenCredential>,
    monitor: Option<Url>,
    route_url: Url,
    poll_interval: Duration,
}

#[derive(Debug, Deserialize)]
struct AsyncOperationResult {
    status: Option<String>,
}

#[async_trait]
impl PendingRouteUpdate for ArmPendingUpdate {
    async fn wait(self: Box<Self>) -> CloudResult<OperationStatus> {
        loop {
            let status = match &self.monitor {
                Some(monitor) => {
                    let result: AsyncOperationResult =
                        get_json(&self.http, &self.credential, monitor.clone()).await?;
                    let label = result
                        .status
                        .ok_or(CloudError::MissingField("status"))?;
                    OperationStatus::from_label(&label)
                }
                None => {
                    let route: Route =
                        get_json(&self.http, &self.credential, self.route_url.clone()).await?;
                    match route.properties.provisioning_state {
                        Some(label) => OperationStatus::from_label(&label),
                        // No state reported; treat the accepted PUT as done.
                        None => OperationStatus::Succeeded,
                    }
                }
            };

            if status.is_terminal() {
                return Ok(status);
            }

            sleep(self.poll_interval).await;
        }
    }
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    credential: &TokenCredential,
    url: Url,
) -> CloudResult<T> {
    let token = credential.bearer_token(http).await?;
    let response = http.get(url).bearer_auth(token).send().await?;

    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(CloudError::NotFound);
    }
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CloudError::Api {
            status: status.as_u16(),
            message: clip(&message),
        });
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

fn clip(message: &str) -> String {
    const MAX: usize = 512;
    if message.len() <= MAX {
        message.to_string()
    } else {
        let mut end = MAX;
        while !message.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &message[..end])
    }
}
