//! Reporting agent subsystem.
//!
//! # Data Flow
//! ```text
//! ticker.rs: interval → check_all(targets) → summarize → POST /health/{app}
//! tail.rs:   command stdout → line → POST /logs/{app}
//!                 both via report.rs (ReportSender → collector)
//! ```
//!
//! # Design Decisions
//! - Report failures are logged and the cycle skipped; nothing is retried
//! - Both tasks stop on the shared shutdown broadcast

pub mod report;
pub mod tail;
pub mod ticker;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AgentConfig;
use crate::health::website_probe;
use crate::lifecycle::Shutdown;

pub use report::{HttpSender, ReportError, ReportSender, Reporter};
pub use tail::LogTail;
pub use ticker::{summarize, HealthTicker, SharedProbe};

/// Run the ticker and, when configured, the log tail until shutdown.
pub async fn run_agent(config: AgentConfig, shutdown: &Shutdown) -> Result<(), reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;

    let reporter = Reporter::new(
        Arc::new(HttpSender::new(client.clone())),
        config.report_url.clone(),
        config.app_name.clone(),
    );

    let timeout = match config.probe_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let probe: SharedProbe = Arc::new(website_probe(client));
    let ticker = HealthTicker::new(
        reporter.clone(),
        probe,
        config.targets.clone(),
        Duration::from_secs(config.interval_secs),
        timeout,
    );
    let ticker_task = tokio::spawn(ticker.run(shutdown.subscribe()));

    let tail_task = config.command.clone().map(|command| {
        let tail = LogTail::new(command, reporter);
        let rx = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = tail.run(rx).await {
                tracing::error!(error = %e, "Log tail failed");
            }
        })
    });

    if let Err(e) = ticker_task.await {
        tracing::error!(error = %e, "Health ticker task failed");
    }
    if let Some(task) = tail_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Log tail task failed");
        }
    }
    Ok(())
}
