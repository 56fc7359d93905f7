//! End-to-end tests of the collector over real HTTP.

mod common;

use std::fs;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::StatusCode;
use serde_json::Value;

use common::start_collector;
use mond::{HealthStatus, MondConfig};

const LINE: &str = r#"10.129.38.1 - - [02/Jul/2021:22:50:59 +0200] "GET /futures HTTP/1.1" 200 7280 "-" "Mozilla/5.0" "92.104.237.155""#;

#[tokio::test]
async fn test_log_ingestion_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let collector = start_collector(&dir.path().join("apps.db.json"), MondConfig::default()).await;
    let client = reqwest::Client::new();

    let res = client.post(collector.url("/logs/Shop")).body(LINE).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    assert!(res.headers().contains_key("x-request-id"));

    let logs: Vec<Value> = client
        .get(collector.url("/logs/shop"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["ip"], "10.129.38.1");
    assert_eq!(logs[0]["method"], "GET");
    assert_eq!(logs[0]["path"], "/futures");
    assert_eq!(logs[0]["version"], "HTTP/1.1");
    assert_eq!(logs[0]["status"], "200");
    assert_eq!(logs[0]["remoteIp"], "92.104.237.155");
    assert_eq!(logs[0]["unix"], 1_625_259_059);
    assert_eq!(logs[0]["raw"], LINE);

    let raw = client.get(collector.url("/rawlogs/shop")).send().await.unwrap();
    assert_eq!(raw.text().await.unwrap(), LINE);
}

#[tokio::test]
async fn test_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apps.db.json");
    let client = reqwest::Client::new();

    {
        let collector = start_collector(&path, MondConfig::default()).await;
        for body in ["one", "two", "three"] {
            let res = client.post(collector.url("/logs/app1")).body(body).send().await.unwrap();
            assert_eq!(res.status(), StatusCode::ACCEPTED);
        }
        let res = client
            .post(collector.url("/health/app1"))
            .body(r#"{"status":"UP","timestamp":42}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::ACCEPTED);
    }

    let persisted: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(persisted[0]["app"], "app1");
    assert_eq!(persisted[0]["health"]["status"], "UP");
    assert_eq!(persisted[0]["logs"].as_array().unwrap().len(), 3);

    let collector = start_collector(&path, MondConfig::default()).await;
    let raw = client
        .get(collector.url("/rawlogs/app1"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(raw, "one\ntwo\nthree");

    let health: HealthStatus = client
        .get(collector.url("/health/app1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health, HealthStatus::new("UP", 42));
}

#[tokio::test]
async fn test_concurrent_reports_are_all_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("apps.db.json");
    let collector = start_collector(&path, MondConfig::default()).await;
    let client = reqwest::Client::new();

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..40 {
        let client = client.clone();
        let url = collector.url(&format!("/logs/app{}", i % 4));
        tasks.spawn(async move { client.post(url).body(format!("line {i}")).send().await.unwrap().status() });
    }
    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::ACCEPTED);
    }

    let persisted: Vec<Value> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let total: usize = persisted
        .iter()
        .map(|app| app["logs"].as_array().unwrap().len())
        .sum();
    assert_eq!(total, 40);
    assert_eq!(collector.store.app_names().len(), 4);
}

#[tokio::test]
async fn test_empty_collector_answers_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let collector = start_collector(&dir.path().join("apps.db.json"), MondConfig::default()).await;
    let client = reqwest::Client::new();

    for path in ["/", "/apps", "/apps/", "/logs/none", "/analytics/none"] {
        let res = client.get(collector.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn test_dashboard_requires_credentials() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MondConfig::default();
    config.auth.username = Some("admin".into());
    config.auth.password = Some("pw".into());
    let collector = start_collector(&dir.path().join("apps.db.json"), config).await;
    let client = reqwest::Client::new();

    let res = client
        .post(collector.url("/health/svc"))
        .body(r#"{"status":"DOWN","timestamp":1}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    let res = client.get(collector.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(collector.url("/"))
        .header("authorization", format!("Basic {}", STANDARD.encode("admin:pw")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Vec<String>>().await.unwrap(), vec!["svc"]);
}
