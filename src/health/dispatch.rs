//! Concurrent probe dispatch (fan-out/fan-in).
//!
//! # Responsibilities
//! - Launch one probe per target concurrently
//! - Collect exactly one result per target through a single channel
//! - Return only once every target has a result
//!
//! # Design Decisions
//! - Each task only ever sends its own target's result, so probes are isolated
//! - An optional per-target timeout turns a hung probe into `DOWN`
//! - A panicking probe yields `DOWN` for its own target only

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time;

use crate::health::status::HealthStatus;
use crate::observability::metrics;

/// Probe every target concurrently and map each target to its status.
///
/// The key set of the returned map always equals the (deduplicated) target set,
/// regardless of how long individual probes take or whether they fail.
pub async fn check_all<F, Fut, I>(
    probe: F,
    targets: I,
    timeout: Option<Duration>,
) -> HashMap<String, HealthStatus>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HealthStatus> + Send + 'static,
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let targets: Vec<String> = targets
        .into_iter()
        .filter(|t| seen.insert(t.clone()))
        .collect();

    let probe = Arc::new(probe);
    let (tx, mut rx) = mpsc::channel::<(String, HealthStatus)>(targets.len().max(1));
    let mut tasks = JoinSet::new();

    for target in &targets {
        let probe = Arc::clone(&probe);
        let tx = tx.clone();
        let target = target.clone();

        tasks.spawn(async move {
            let check = probe(target.clone());
            let status = match timeout {
                Some(limit) => match time::timeout(limit, check).await {
                    Ok(status) => status,
                    Err(_) => {
                        tracing::warn!(target = %target, timeout = ?limit, "Probe timed out");
                        metrics::record_probe("timeout");
                        HealthStatus::down_now()
                    }
                },
                None => check.await,
            };
            // Capacity equals the target count, so this never waits.
            let _ = tx.send((target, status)).await;
        });
    }
    drop(tx);

    let mut results = HashMap::with_capacity(targets.len());
    while let Some((target, status)) = rx.recv().await {
        results.insert(target, status);
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "Probe task failed");
        }
    }

    for target in targets {
        results.entry(target).or_insert_with_key(|target| {
            tracing::warn!(target = %target, "Probe produced no result, marking DOWN");
            metrics::record_probe("panic");
            HealthStatus::down_now()
        });
    }

    results
}
