//! Agent reporting against a live collector and mock websites.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use common::{start_collector, start_mock_backend, start_slow_backend};
use mond::agent::tail::forward_lines;
use mond::agent::{run_agent, HealthTicker, HttpSender, Reporter, SharedProbe};
use mond::config::AgentConfig;
use mond::health::{check_all, website_probe};
use mond::lifecycle::Shutdown;
use mond::MondConfig;

fn reporter_for(base_url: String, app: &str) -> Reporter {
    Reporter::new(Arc::new(HttpSender::new(reqwest::Client::new())), base_url, app)
}

#[tokio::test]
async fn test_check_all_against_real_websites() {
    let up = start_mock_backend(200).await;
    let failing = start_mock_backend(503).await;
    let targets = vec![
        format!("http://{up}/"),
        format!("http://{failing}/"),
        "http://127.0.0.1:9/".to_string(),
    ];

    let results = check_all(website_probe(reqwest::Client::new()), targets.clone(), None).await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[&targets[0]].state, "UP");
    assert_eq!(results[&targets[1]].state, "503 Service Unavailable");
    assert_eq!(results[&targets[2]].state, "DOWN");
}

#[tokio::test]
async fn test_probe_timeout_marks_slow_site_down() {
    let slow = start_slow_backend(Duration::from_secs(5)).await;
    let target = format!("http://{slow}/");

    let results = check_all(
        website_probe(reqwest::Client::new()),
        vec![target.clone()],
        Some(Duration::from_millis(200)),
    )
    .await;
    assert_eq!(results[&target].state, "DOWN");
}

#[tokio::test]
async fn test_ticker_reports_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let collector = start_collector(&dir.path().join("apps.db.json"), MondConfig::default()).await;
    let up = start_mock_backend(200).await;
    let failing = start_mock_backend(500).await;

    let probe: SharedProbe = Arc::new(website_probe(reqwest::Client::new()));
    let ticker = HealthTicker::new(
        reporter_for(collector.base_url(), "Shop"),
        probe,
        vec![format!("http://{up}/"), format!("http://{failing}/")],
        Duration::from_secs(5),
        Some(Duration::from_secs(2)),
    );

    let status = ticker.tick().await;
    assert_eq!(status.state, "500 Internal Server Error");
    assert_eq!(collector.store.health("shop").state, "500 Internal Server Error");
}

#[tokio::test]
async fn test_forwarded_lines_reach_the_collector() {
    let dir = tempfile::tempdir().unwrap();
    let collector = start_collector(&dir.path().join("apps.db.json"), MondConfig::default()).await;
    let reporter = reporter_for(collector.base_url(), "web");
    let (_tx, rx) = broadcast::channel(1);

    let input: &[u8] = b"10.0.0.1 - - [02/Jul/2021:22:50:59 +0200] \"GET / HTTP/1.1\" 200 1 \"-\" \"curl\" \"1.2.3.4\"\nplain line\n";
    let delivered = forward_lines(input, &reporter, rx).await;

    assert_eq!(delivered, 2);
    let logs = collector.store.access_logs("web");
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].forwarded_ip, "1.2.3.4");
    assert_eq!(logs[1].raw_text(), "plain line");
}

#[cfg(unix)]
#[tokio::test]
async fn test_agent_runs_until_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let collector = start_collector(&dir.path().join("apps.db.json"), MondConfig::default()).await;
    let up = start_mock_backend(200).await;

    let config = AgentConfig {
        report_url: collector.base_url(),
        app_name: "agent".into(),
        targets: vec![format!("http://{up}/")],
        interval_secs: 1,
        probe_timeout_secs: 2,
        command: Some("echo started".into()),
    };

    let shutdown = Shutdown::new();
    let stop = async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        shutdown.trigger();
    };
    let (result, ()) = tokio::join!(run_agent(config, &shutdown), stop);
    assert!(result.is_ok());

    assert!(collector.store.health("agent").is_up());
    assert_eq!(collector.store.access_logs("agent")[0].raw_text(), "started");
}
