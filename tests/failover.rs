//! End-to-end cycle scenarios against the in-memory cloud.

use std::sync::Arc;
use std::time::Duration;

use nva_failover::cloud::api::RouteTarget;
use nva_failover::cloud::types::{Route, RouteProperties};
use nva_failover::failover::policy::select_next_hops;
use nva_failover::health::state::{ApplianceHealth, ApplianceRole, HealthError};
use nva_failover::orchestrator::{CycleError, Orchestrator};
use nva_failover::routes::reconciler::reconcile_routes;
use nva_failover::routes::{discover_routes, RouteRecord};

mod common;

use common::{test_config, MockCloud, UpdateBehavior};

fn orchestrator(cloud: Arc<MockCloud>, config: nva_failover::AppConfig) -> Orchestrator {
    Orchestrator::new(cloud, Arc::new(config))
}

/// Standard fixture: both appliances registered, one tagged table with the
/// managed route pointing at `current_hop`.
fn standard_fixture(primary_state: &str, secondary_state: &str, current_hop: &str) -> Arc<MockCloud> {
    let cloud = Arc::new(MockCloud::new());
    cloud.add_appliance("sub-a", "rg-nva", "nva-a", "10.0.0.4", primary_state);
    cloud.add_appliance("sub-a", "rg-nva", "nva-b", "10.0.0.5", secondary_state);
    cloud.add_route_table("sub-a", "rg-spoke", "rt-spoke", true);
    cloud.add_route("sub-a", "rg-spoke", "rt-spoke", "default", current_hop);
    cloud
}

#[tokio::test]
async fn failover_rewrites_stale_route_to_primary() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.routes, 1);
    assert_eq!(report.reconcile.planned, 1);
    assert_eq!(report.reconcile.succeeded, 1);
    assert_eq!(report.reconcile.failed, 0);
    assert_eq!(cloud.submitted_next_hops(), vec!["10.0.0.4".to_string()]);
}

#[tokio::test]
async fn valid_secondary_is_left_alone_without_preempt() {
    let cloud = standard_fixture("running", "running", "10.0.0.5");
    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.reconcile.planned, 0);
    assert_eq!(report.reconcile.skipped, 1);
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn preempt_forces_failback_to_primary() {
    let cloud = standard_fixture("running", "running", "10.0.0.5");
    let mut config = test_config();
    config.scheduler.preempt = true;

    let report = orchestrator(cloud.clone(), config).run_cycle().await.unwrap();

    assert_eq!(report.reconcile.planned, 1);
    assert_eq!(report.reconcile.succeeded, 1);
    assert_eq!(cloud.submitted_next_hops(), vec!["10.0.0.4".to_string()]);
}

#[tokio::test]
async fn preempt_without_standby_does_not_touch_valid_route() {
    // Primary down: only the secondary is valid, so preempt has nothing to
    // fail back to and the route must stay put.
    let cloud = standard_fixture("deallocated", "running", "10.0.0.5");
    let mut config = test_config();
    config.scheduler.preempt = true;

    let report = orchestrator(cloud.clone(), config).run_cycle().await.unwrap();

    assert_eq!(report.reconcile.planned, 0);
    assert_eq!(report.reconcile.skipped, 1);
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn sibling_routes_are_isolated_from_update_failure() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    cloud.add_route_table("sub-a", "rg-spoke", "rt-dmz", true);
    cloud.add_route("sub-a", "rg-spoke", "rt-dmz", "default", "10.0.0.9");
    cloud.set_update_behavior("rt-dmz", "default", UpdateBehavior::TerminalFailed);

    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.reconcile.planned, 2);
    assert_eq!(report.reconcile.succeeded, 1);
    assert_eq!(report.reconcile.failed, 1);
    // Both mutations were submitted; the failure stayed with its route.
    assert_eq!(cloud.submit_calls(), 2);
}

#[tokio::test]
async fn submission_rejection_does_not_block_sibling() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    cloud.add_route_table("sub-a", "rg-spoke", "rt-dmz", true);
    cloud.add_route("sub-a", "rg-spoke", "rt-dmz", "default", "10.0.0.9");
    cloud.set_update_behavior("rt-dmz", "default", UpdateBehavior::RejectSubmit);

    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.reconcile.planned, 2);
    assert_eq!(report.reconcile.succeeded, 1);
    assert_eq!(report.reconcile.failed, 1);
    assert_eq!(cloud.submitted_next_hops(), vec!["10.0.0.4".to_string()]);
}

#[tokio::test]
async fn zero_appliances_aborts_before_discovery() {
    let cloud = Arc::new(MockCloud::new());
    cloud.add_resource_group("sub-a", "rg-nva");
    cloud.add_route_table("sub-a", "rg-spoke", "rt-spoke", true);
    cloud.add_route("sub-a", "rg-spoke", "rt-spoke", "default", "10.0.0.9");

    let err = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CycleError::Health(HealthError::WrongApplianceCount(0))
    ));
    assert_eq!(cloud.discovery_calls(), 0);
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn lone_appliance_aborts_cycle() {
    let cloud = Arc::new(MockCloud::new());
    cloud.add_appliance("sub-a", "rg-nva", "nva-a", "10.0.0.4", "running");

    let err = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CycleError::Health(HealthError::WrongApplianceCount(1))
    ));
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn pair_with_nothing_running_aborts_cycle() {
    let cloud = standard_fixture("stopped", "deallocated", "10.0.0.9");

    let err = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CycleError::Health(HealthError::NoHealthyAppliance)
    ));
    assert_eq!(cloud.discovery_calls(), 0);
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn multi_interface_appliance_aborts_cycle() {
    let cloud = Arc::new(MockCloud::new());
    cloud.add_appliance("sub-a", "rg-nva", "nva-a", "10.0.0.4", "running");
    cloud.add_vm_with_nics("sub-a", "rg-nva", "nva-b", 2);

    let err = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CycleError::Health(HealthError::MultipleInterfaces { count: 2, .. })
    ));
    assert_eq!(cloud.discovery_calls(), 0);
}

#[tokio::test]
async fn disabled_cycle_touches_nothing() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    let mut config = test_config();
    config.scheduler.enabled = false;

    let report = orchestrator(cloud.clone(), config).run_cycle().await.unwrap();

    assert!(report.disabled);
    assert_eq!(cloud.probe_calls(), 0);
    assert_eq!(cloud.discovery_calls(), 0);
    assert_eq!(cloud.submit_calls(), 0);
}

#[tokio::test]
async fn missing_route_name_is_skipped_not_fatal() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    // Tagged table that does not carry the managed route name.
    cloud.add_route_table("sub-a", "rg-spoke", "rt-empty", true);

    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    assert_eq!(report.routes, 1);
    assert_eq!(report.reconcile.succeeded, 1);
}

#[tokio::test]
async fn untagged_tables_are_ignored() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.5");
    cloud.add_route_table("sub-a", "rg-other", "rt-untagged", false);
    cloud.add_route("sub-a", "rg-other", "rt-untagged", "default", "10.0.0.9");

    let report = orchestrator(cloud.clone(), test_config())
        .run_cycle()
        .await
        .unwrap();

    // Only the tagged table's route was discovered and rewritten.
    assert_eq!(report.routes, 1);
    assert_eq!(cloud.submitted_next_hops(), vec!["10.0.0.4".to_string()]);
}

#[tokio::test]
async fn discovery_spans_other_subscriptions() {
    let cloud = standard_fixture("running", "stopped", "10.0.0.9");
    cloud.add_route_table("sub-b", "rg-remote", "rt-remote", true);
    cloud.add_route("sub-b", "rg-remote", "rt-remote", "default", "10.0.0.9");

    let mut config = test_config();
    config.routes.subscriptions = vec!["sub-b".into()];

    let report = orchestrator(cloud.clone(), config).run_cycle().await.unwrap();

    assert_eq!(report.routes, 2);
    assert_eq!(report.reconcile.succeeded, 2);
}

#[tokio::test(start_paused = true)]
async fn stuck_update_is_bounded_by_timeout() {
    let cloud = MockCloud::new();
    cloud.add_route_table("sub-a", "rg-spoke", "rt-spoke", true);
    cloud.add_route("sub-a", "rg-spoke", "rt-spoke", "default", "10.0.0.9");
    cloud.set_update_behavior("rt-spoke", "default", UpdateBehavior::Hang);

    let appliances = vec![
        ApplianceHealth {
            name: "nva-a".into(),
            role: ApplianceRole::Primary,
            private_ip: "10.0.0.4".parse().unwrap(),
            status_label: "running".into(),
        },
        ApplianceHealth {
            name: "nva-b".into(),
            role: ApplianceRole::Secondary,
            private_ip: "10.0.0.5".parse().unwrap(),
            status_label: "stopped".into(),
        },
    ];
    let desired = select_next_hops(&appliances).unwrap();

    let routes = vec![RouteRecord {
        target: RouteTarget {
            subscription_id: "sub-a".into(),
            resource_group: "rg-spoke".into(),
            route_table: "rt-spoke".into(),
            route_name: "default".into(),
        },
        route: Route {
            id: None,
            name: "default".into(),
            properties: RouteProperties {
                address_prefix: Some("0.0.0.0/0".into()),
                next_hop_type: Some("VirtualAppliance".into()),
                next_hop_ip_address: Some("10.0.0.9".into()),
                provisioning_state: None,
            },
        },
    }];

    let report =
        reconcile_routes(&cloud, routes, &desired, false, Duration::from_secs(5)).await;

    assert_eq!(report.planned, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);
}

#[tokio::test]
async fn discovery_alone_reads_and_never_writes() {
    let cloud = standard_fixture("running", "running", "10.0.0.9");
    let config = test_config();
    let subs = config
        .routes
        .effective_subscriptions(&config.appliances.subscription_id);

    let records = discover_routes(&*cloud, &config.routes, &subs).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].qualified_name(), "sub-a/rt-spoke/default");
    assert_eq!(cloud.submit_calls(), 0);
}
