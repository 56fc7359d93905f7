//! Periodic health probing and reporting.
//!
//! # Responsibilities
//! - Probe every target on each tick
//! - Fold the per-target results into one application status
//! - Report that status to the collector
//!
//! # Design Decisions
//! - A round is a barrier: the report is sent only once every target answered
//! - Shutdown stops the loop between rounds; a running round finishes

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::agent::report::Reporter;
use crate::health::probe::ProbeFuture;
use crate::health::{check_all, HealthStatus};

/// Probe function shared across rounds.
pub type SharedProbe = Arc<dyn Fn(String) -> ProbeFuture + Send + Sync>;

/// Fold per-target results: all `UP` → `UP`, otherwise the status of the
/// first failing target in `targets` order.
pub fn summarize(targets: &[String], results: &HashMap<String, HealthStatus>) -> HealthStatus {
    targets
        .iter()
        .map(|target| results.get(target).cloned().unwrap_or_else(HealthStatus::down_now))
        .find(|status| !status.is_up())
        .unwrap_or_else(HealthStatus::up_now)
}

pub struct HealthTicker {
    reporter: Reporter,
    probe: SharedProbe,
    targets: Vec<String>,
    interval: Duration,
    timeout: Option<Duration>,
}

impl HealthTicker {
    pub fn new(
        reporter: Reporter,
        probe: SharedProbe,
        targets: Vec<String>,
        interval: Duration,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            reporter,
            probe,
            targets,
            interval,
            timeout,
        }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            app = %self.reporter.app(),
            targets = self.targets.len(),
            interval = ?self.interval,
            "Health ticker starting"
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health ticker received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// Run one probe round and report the folded status.
    pub async fn tick(&self) -> HealthStatus {
        let probe = Arc::clone(&self.probe);
        let results = check_all(move |target| probe(target), self.targets.clone(), self.timeout).await;
        let status = summarize(&self.targets, &results);

        match self.reporter.report_health(&status).await {
            Ok(()) => tracing::debug!(app = %self.reporter.app(), status = %status.state, "Health reported"),
            Err(e) => tracing::warn!(app = %self.reporter.app(), error = %e, "Health report failed, skipping cycle"),
        }
        status
    }
}
