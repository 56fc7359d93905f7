//! Default website probe.
//!
//! # Classification
//! - transport failure → `DOWN`
//! - 2xx → `UP`
//! - any other status → the status line text (e.g. `503 Service Unavailable`)
//!
//! Every result is stamped with the current time.

use std::future::Future;
use std::pin::Pin;

use reqwest::header::USER_AGENT;
use reqwest::{Client, StatusCode};

use crate::health::status::{unix_now, HealthStatus};
use crate::observability::metrics;

/// Boxed future returned by [`website_probe`].
pub type ProbeFuture = Pin<Box<dyn Future<Output = HealthStatus> + Send>>;

/// Issue a `HEAD` request to `url` and classify the outcome.
pub async fn check_website(client: &Client, url: &str) -> HealthStatus {
    let response = client
        .head(url)
        .header(USER_AGENT, "mond-agent-health-check")
        .send()
        .await;

    match response {
        Ok(response) => {
            let status = response.status();
            if status.is_success() {
                tracing::debug!(url = %url, status = %status, "Probe succeeded");
                metrics::record_probe("up");
                HealthStatus::up_now()
            } else {
                tracing::warn!(url = %url, status = %status, "Probe failed: non-success status");
                metrics::record_probe("status");
                HealthStatus::new(status_text(status), unix_now())
            }
        }
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Probe failed: connection error");
            metrics::record_probe("down");
            HealthStatus::down_now()
        }
    }
}

/// Wrap [`check_website`] as a probe function for [`check_all`](crate::health::check_all).
pub fn website_probe(client: Client) -> impl Fn(String) -> ProbeFuture + Send + Sync + 'static {
    move |url: String| {
        let client = client.clone();
        Box::pin(async move { check_website(&client, &url).await })
    }
}

fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
