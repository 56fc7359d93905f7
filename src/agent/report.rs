//! Reporting to the collector.
//!
//! Health goes to `{base}/health/{app}` as JSON, raw lines to
//! `{base}/logs/{app}` as plain text. Only `202 Accepted` counts as delivered.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;
use url::Url;

use crate::health::HealthStatus;
use crate::observability::metrics;

/// Errors raised while delivering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("collector answered {status}, expected 202")]
    Rejected { status: u16 },

    #[error("cannot encode report: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid collector URL '{0}'")]
    InvalidUrl(String),
}

/// Transport used to deliver reports.
#[async_trait]
pub trait ReportSender: Send + Sync {
    /// POST `body` to `url` and return the response status code.
    async fn post(&self, url: &str, content_type: &'static str, body: String) -> Result<u16, ReportError>;
}

/// [`ReportSender`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpSender {
    client: Client,
}

impl HttpSender {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportSender for HttpSender {
    async fn post(&self, url: &str, content_type: &'static str, body: String) -> Result<u16, ReportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }
}

/// Sends reports for one application.
#[derive(Clone)]
pub struct Reporter {
    sender: Arc<dyn ReportSender>,
    base_url: String,
    app: String,
}

impl Reporter {
    pub fn new(sender: Arc<dyn ReportSender>, base_url: impl Into<String>, app: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            sender,
            base_url,
            app: app.into(),
        }
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    /// `{base}/{kind}/{app}` with the app name percent-encoded as one segment.
    fn endpoint(&self, kind: &str) -> Result<Url, ReportError> {
        let invalid = || ReportError::InvalidUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(kind)
            .push(&self.app);
        Ok(url)
    }

    /// Report the application's health.
    pub async fn report_health(&self, status: &HealthStatus) -> Result<(), ReportError> {
        let body = serde_json::to_string(status)?;
        let result = self.deliver("health", "application/json", body).await;
        metrics::record_report("health", result.is_ok());
        result
    }

    /// Report one raw access-log line.
    pub async fn report_raw_log(&self, line: &str) -> Result<(), ReportError> {
        let result = self
            .deliver("logs", "text/plain; charset=utf-8", line.to_string())
            .await;
        metrics::record_report("log", result.is_ok());
        result
    }

    async fn deliver(&self, kind: &str, content_type: &'static str, body: String) -> Result<(), ReportError> {
        let url = self.endpoint(kind)?;
        match self.sender.post(url.as_str(), content_type, body).await? {
            202 => Ok(()),
            status => Err(ReportError::Rejected { status }),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every post and answers with a fixed status.
    pub(crate) struct RecordingSender {
        pub status: u16,
        pub posts: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSender {
        pub fn answering(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                posts: Mutex::new(Vec::new()),
            })
        }

        pub fn posts(&self) -> Vec<(String, String)> {
            self.posts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ReportSender for RecordingSender {
        async fn post(&self, url: &str, _content_type: &'static str, body: String) -> Result<u16, ReportError> {
            self.posts.lock().unwrap().push((url.to_string(), body));
            Ok(self.status)
        }
    }

    #[tokio::test]
    async fn test_health_report_is_json() {
        let sender = RecordingSender::answering(202);
        let reporter = Reporter::new(sender.clone(), "http://collector:5000/", "shop");

        reporter
            .report_health(&HealthStatus::new("UP", 1_700_000_000))
            .await
            .unwrap();

        assert_eq!(
            sender.posts(),
            vec![(
                "http://collector:5000/health/shop".to_string(),
                r#"{"status":"UP","timestamp":1700000000}"#.to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_raw_log_goes_to_logs_endpoint() {
        let sender = RecordingSender::answering(202);
        let reporter = Reporter::new(sender.clone(), "http://collector:5000", "shop");

        reporter.report_raw_log("GET / 200").await.unwrap();

        let posts = sender.posts();
        assert_eq!(posts[0].0, "http://collector:5000/logs/shop");
        assert_eq!(posts[0].1, "GET / 200");
    }

    #[tokio::test]
    async fn test_only_accepted_counts_as_delivered() {
        for status in [200, 201, 400, 500] {
            let reporter = Reporter::new(RecordingSender::answering(status), "http://c", "a");
            let err = reporter.report_raw_log("x").await.unwrap_err();
            assert!(matches!(err, ReportError::Rejected { status: s } if s == status));
        }
    }

    #[tokio::test]
    async fn test_unreachable_collector_is_transport_error() {
        let sender = Arc::new(HttpSender::new(Client::new()));
        let reporter = Reporter::new(sender, "http://127.0.0.1:9", "a");
        let err = reporter.report_health(&HealthStatus::healthy()).await.unwrap_err();
        assert!(matches!(err, ReportError::Transport(_)));
    }

    #[tokio::test]
    async fn test_app_name_is_one_encoded_segment() {
        let sender = RecordingSender::answering(202);
        let reporter = Reporter::new(sender.clone(), "http://collector:5000/mond", "my app?#1");

        reporter.report_raw_log("x").await.unwrap();

        assert_eq!(sender.posts()[0].0, "http://collector:5000/mond/logs/my%20app%3F%231");
    }

    #[tokio::test]
    async fn test_unusable_base_url_is_reported() {
        let sender = RecordingSender::answering(202);
        let reporter = Reporter::new(sender.clone(), "not a url", "shop");

        let err = reporter.report_raw_log("x").await.unwrap_err();
        assert!(matches!(err, ReportError::InvalidUrl(_)));
        assert!(sender.posts().is_empty());
    }
}
