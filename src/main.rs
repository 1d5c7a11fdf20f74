//! NVA Route Failover service.
//!
//! Watches a primary/secondary pair of network virtual appliances and keeps
//! tagged route-table entries pointed at a healthy one.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────────────┐
//!                 │                  ONE HEARTBEAT CYCLE                   │
//!                 │                                                        │
//!   timer tick    │  ┌────────┐   ┌──────────┐   ┌───────────┐            │
//!   ─────────────▶│  │ health │──▶│ failover │──▶│   route   │            │
//!                 │  │ probe  │   │  policy  │   │ discovery │            │
//!                 │  └────────┘   └──────────┘   └─────┬─────┘            │
//!                 │   fatal error aborts the           │                   │
//!                 │   cycle before any mutation        ▼                   │
//!                 │                             ┌─────────────┐            │
//!                 │                             │ reconciler  │──▶ per-route
//!                 │                             │ submit+await│    outcomes
//!                 │                             └─────────────┘            │
//!                 │                                                        │
//!                 │  ┌──────────────────────────────────────────────────┐  │
//!                 │  │            Cross-Cutting Concerns                │  │
//!                 │  │  ┌────────┐ ┌───────┐ ┌───────────┐ ┌─────────┐ │  │
//!                 │  │  │ config │ │ cloud │ │observa-   │ │lifecycle│ │  │
//!                 │  │  │        │ │ api   │ │bility     │ │         │ │  │
//!                 │  │  └────────┘ └───────┘ └───────────┘ └─────────┘ │  │
//!                 │  └──────────────────────────────────────────────────┘  │
//!                 └────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use nva_failover::cloud::api::CloudApi;
use nva_failover::cloud::arm::ArmClient;
use nva_failover::cloud::auth::TokenCredential;
use nva_failover::config::loader;
use nva_failover::lifecycle::{heartbeat::Heartbeat, signals, Shutdown};
use nva_failover::observability::{logging, metrics};
use nva_failover::Orchestrator;

#[derive(Parser)]
#[command(name = "nva-failover", version)]
#[command(about = "Active/standby failover for NVA next-hop routes", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run a single reconciliation cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Configuration errors must be logged before scheduling begins, so the
    // subscriber falls back to defaults when the config never materializes.
    let loaded = match loader::load(cli.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            logging::init_fallback();
            tracing::error!(error = %e, "Invalid configuration, refusing to start");
            std::process::exit(1);
        }
    };
    let config = loaded.config;

    logging::init(&config.observability);

    for warning in &loaded.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        heartbeat_secs = config.scheduler.heartbeat_secs,
        enabled = config.scheduler.enabled,
        preempt = config.scheduler.preempt,
        "nva-failover starting"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let credential = TokenCredential::from_config(&config.cloud);
    let arm = match ArmClient::new(&config.cloud, credential) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build management API client");
            std::process::exit(1);
        }
    };

    let cloud: Arc<dyn CloudApi> = Arc::new(arm);
    let config = Arc::new(config);
    let orchestrator = Orchestrator::new(cloud, config.clone());

    if cli.once {
        match orchestrator.run_cycle().await {
            Ok(report) => {
                tracing::info!(summary = %report, "Cycle complete");
            }
            Err(e) => {
                tracing::error!(error = %e, "Cycle aborted");
                std::process::exit(1);
            }
        }
        return;
    }

    let shutdown = Shutdown::new();
    let heartbeat_rx = shutdown.subscribe();

    tokio::spawn(async move {
        signals::wait_for_terminate().await;
        tracing::info!("Shutdown signal received");
        shutdown.trigger();
    });

    Heartbeat::new(orchestrator, config.scheduler.heartbeat_secs)
        .run(heartbeat_rx)
        .await;

    tracing::info!("Shutdown complete");
}
