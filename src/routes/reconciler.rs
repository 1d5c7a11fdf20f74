//! Per-route reconciliation against the desired next hops.
//!
//! # Responsibilities
//! - Decide, independently per route, whether it needs a new next hop
//! - Phase 1: submit every planned mutation without awaiting any of them
//! - Phase 2: await each pending mutation to a terminal state, bounded by
//!   the configured per-route timeout
//!
//! # Design Decisions
//! - Batch wall-clock is bounded by the slowest single update, not the sum
//! - One route's failure never cancels or blocks a sibling's mutation
//! - No retry here; the next heartbeat is the retry

use std::net::IpAddr;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::time::timeout;

use crate::cloud::api::CloudApi;
use crate::cloud::types::Route;
use crate::failover::policy::NextHopList;
use crate::observability::metrics;
use crate::routes::outcome::UpdateOutcome;
use crate::routes::record::RouteRecord;

/// What to do with one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Rewrite the next hop. `preempting` marks a failback forced while the
    /// current hop was still valid.
    Update { next_hop: IpAddr, preempting: bool },
    /// Current next hop is already a member of the valid list.
    Skip,
}

/// Decide one route against the desired list. Pure; no cross-route state.
pub fn decide(current: Option<IpAddr>, desired: &NextHopList, preempt: bool) -> RouteDecision {
    if preempt && desired.len() > 1 && current != Some(desired.preferred()) {
        return RouteDecision::Update {
            next_hop: desired.preferred(),
            preempting: true,
        };
    }

    if let Some(current) = current {
        if desired.contains(current) {
            return RouteDecision::Skip;
        }
    }

    RouteDecision::Update {
        next_hop: desired.preferred(),
        preempting: false,
    }
}

/// Aggregated outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Routes that needed a mutation.
    pub planned: usize,
    /// Routes already pointing at a valid next hop.
    pub skipped: usize,
    /// Mutations that reached a successful terminal state.
    pub succeeded: usize,
    /// Mutations rejected at submission or terminally unsuccessful.
    pub failed: usize,
}

impl std::fmt::Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "planned={} skipped={} succeeded={} failed={}",
            self.planned, self.skipped, self.succeeded, self.failed
        )
    }
}

struct Tracked {
    record: RouteRecord,
    outcome: UpdateOutcome,
}

/// Reconcile every discovered route against the desired next hops.
///
/// `update_timeout` bounds the await phase per route; a mutation still
/// pending past it is recorded as failed and left for the next cycle.
pub async fn reconcile_routes(
    cloud: &dyn CloudApi,
    routes: Vec<RouteRecord>,
    desired: &NextHopList,
    preempt: bool,
    update_timeout: Duration,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut tracked: Vec<Tracked> = Vec::with_capacity(routes.len());
    let mut planned: Vec<(usize, Route)> = Vec::new();

    for record in routes {
        match decide(record.current_next_hop(), desired, preempt) {
            RouteDecision::Skip => {
                tracing::info!(
                    route = %record.qualified_name(),
                    "Next hop already valid, skipping update"
                );
                report.skipped += 1;
                tracked.push(Tracked {
                    record,
                    outcome: UpdateOutcome::NotAttempted,
                });
            }
            RouteDecision::Update { next_hop, preempting } => {
                if preempting {
                    tracing::warn!(
                        route = %record.qualified_name(),
                        "Preempt enabled, failing back to primary"
                    );
                }
                report.planned += 1;

                let mut desired_route = record.route.clone();
                desired_route.properties.next_hop_ip_address = Some(next_hop.to_string());
                desired_route.properties.provisioning_state = None;

                planned.push((tracked.len(), desired_route));
                tracked.push(Tracked {
                    record,
                    outcome: UpdateOutcome::NotAttempted,
                });
            }
        }
    }

    // Phase 1: submit everything before awaiting anything.
    let submissions = join_all(planned.into_iter().map(|(index, desired_route)| {
        let target = tracked[index].record.target.clone();
        async move {
            let result = cloud.begin_update_route(&target, desired_route).await;
            (index, result)
        }
    }))
    .await;

    for (index, result) in submissions {
        tracked[index].outcome = match result {
            Ok(handle) => UpdateOutcome::Pending(handle),
            Err(e) => {
                tracing::error!(
                    route = %tracked[index].record.qualified_name(),
                    error = %e,
                    "Failed to submit route update"
                );
                UpdateOutcome::Failed(e.to_string())
            }
        };
    }

    // Phase 2: await each pending mutation; failures stay with their route.
    for entry in &mut tracked {
        let outcome = std::mem::replace(&mut entry.outcome, UpdateOutcome::NotAttempted);
        entry.outcome = match outcome {
            UpdateOutcome::Pending(handle) => {
                match timeout(update_timeout, handle.wait()).await {
                    Ok(Ok(status)) if status.is_success() => {
                        tracing::info!(
                            route = %entry.record.qualified_name(),
                            "Succeeded updating route"
                        );
                        UpdateOutcome::Succeeded
                    }
                    Ok(Ok(status)) => {
                        tracing::error!(
                            route = %entry.record.qualified_name(),
                            status = %status,
                            "Failed updating route"
                        );
                        UpdateOutcome::Failed(status.to_string())
                    }
                    Ok(Err(e)) => {
                        tracing::error!(
                            route = %entry.record.qualified_name(),
                            error = %e,
                            "Failed updating route"
                        );
                        UpdateOutcome::Failed(e.to_string())
                    }
                    Err(_) => {
                        tracing::error!(
                            route = %entry.record.qualified_name(),
                            timeout_secs = update_timeout.as_secs(),
                            "Route update still pending past deadline"
                        );
                        UpdateOutcome::Failed(format!(
                            "no terminal state within {}s",
                            update_timeout.as_secs()
                        ))
                    }
                }
            }
            other => other,
        };

        match &entry.outcome {
            UpdateOutcome::Succeeded => {
                report.succeeded += 1;
                metrics::record_route_update(true);
            }
            UpdateOutcome::Failed(_) => {
                report.failed += 1;
                metrics::record_route_update(false);
            }
            _ => {}
        }
    }

    report
}
