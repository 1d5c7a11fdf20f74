//! Periodic cycle trigger.
//!
//! # Responsibilities
//! - Tick at the configured heartbeat
//! - Run one cycle per tick, awaited in the loop body so invocations are
//!   serialized by construction
//! - Keep ticking through fatal cycle errors; stop only on shutdown

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::orchestrator::Orchestrator;

pub struct Heartbeat {
    orchestrator: Orchestrator,
    period: Duration,
}

impl Heartbeat {
    pub fn new(orchestrator: Orchestrator, heartbeat_secs: u64) -> Self {
        Self {
            orchestrator,
            period: Duration::from_secs(heartbeat_secs.max(1)),
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(period_secs = self.period.as_secs(), "Heartbeat starting");

        // First cycle fires one full period after startup, not immediately.
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.orchestrator.run_cycle().await {
                        Ok(report) => {
                            tracing::info!(summary = %report, "Cycle complete");
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                "Cycle aborted, waiting for next heartbeat"
                            );
                        }
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Heartbeat received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}
