//! One reconciliation cycle.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::cloud::api::CloudApi;
use crate::cloud::types::CloudError;
use crate::config::schema::AppConfig;
use crate::failover::policy::select_next_hops;
use crate::health::probe::probe_appliances;
use crate::health::state::HealthError;
use crate::observability::metrics;
use crate::routes::discovery::discover_routes;
use crate::routes::reconciler::{reconcile_routes, ReconcileReport};

/// Conditions that abort a cycle wholesale. The process stays scheduled;
/// the next heartbeat re-evaluates from scratch.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("health probe failed: {0}")]
    Health(#[from] HealthError),

    #[error("route discovery failed: {0}")]
    Discovery(#[from] CloudError),
}

/// Summary of one cycle, for logging and metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleReport {
    pub disabled: bool,
    pub appliances: usize,
    pub routes: usize,
    pub reconcile: ReconcileReport,
}

impl CycleReport {
    fn disabled() -> Self {
        Self {
            disabled: true,
            ..Self::default()
        }
    }
}

impl std::fmt::Display for CycleReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.disabled {
            return write!(f, "disabled");
        }
        write!(
            f,
            "appliances={} routes={} {}",
            self.appliances, self.routes, self.reconcile
        )
    }
}

/// Sequences probe → policy → discovery → reconciliation.
pub struct Orchestrator {
    cloud: Arc<dyn CloudApi>,
    config: Arc<AppConfig>,
}

impl Orchestrator {
    pub fn new(cloud: Arc<dyn CloudApi>, config: Arc<AppConfig>) -> Self {
        Self { cloud, config }
    }

    /// Run one cycle to completion.
    ///
    /// A `HealthError` aborts before any discovery or mutation call; route
    /// failures are absorbed into the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        if !self.config.scheduler.enabled {
            tracing::info!("Disabled, skipping cycle");
            return Ok(CycleReport::disabled());
        }

        let cycle_id = Uuid::new_v4();
        let span = tracing::info_span!("cycle", id = %cycle_id);
        let result = self.run_cycle_inner().instrument(span).await;

        match &result {
            Ok(report) if report.reconcile.failed > 0 => metrics::record_cycle("partial"),
            Ok(_) => metrics::record_cycle("ok"),
            Err(_) => metrics::record_cycle("aborted"),
        }

        result
    }

    async fn run_cycle_inner(&self) -> Result<CycleReport, CycleError> {
        tracing::info!("Starting reconciliation cycle");

        let appliances = probe_appliances(self.cloud.as_ref(), &self.config.appliances).await?;
        for appliance in &appliances {
            metrics::record_appliance_health(&appliance.name, appliance.is_running());
        }

        let desired = select_next_hops(&appliances)?;
        tracing::info!(next_hops = %desired, "Valid next hops selected");

        let subscriptions = self
            .config
            .routes
            .effective_subscriptions(&self.config.appliances.subscription_id);
        let routes =
            discover_routes(self.cloud.as_ref(), &self.config.routes, &subscriptions).await?;
        metrics::record_routes_discovered(routes.len());
        tracing::info!(count = routes.len(), "Discovered managed routes");
        if tracing::enabled!(tracing::Level::DEBUG) {
            let names: Vec<String> = routes.iter().map(|r| r.qualified_name()).collect();
            tracing::debug!(routes = ?names, "Managed route set");
        }

        let route_count = routes.len();
        let reconcile = reconcile_routes(
            self.cloud.as_ref(),
            routes,
            &desired,
            self.config.scheduler.preempt,
            Duration::from_secs(self.config.cloud.update_timeout_secs),
        )
        .await;

        Ok(CycleReport {
            disabled: false,
            appliances: appliances.len(),
            routes: route_count,
            reconcile,
        })
    }
}
