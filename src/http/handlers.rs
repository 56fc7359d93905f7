//! Route handlers for the collector API.
//!
//! Application names are lower-cased here before they reach the store.
//! Store writes run on the blocking pool.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::health::HealthStatus;
use crate::http::request::request_id;
use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::parser::Observation;

fn normalize(app: &str) -> String {
    app.to_lowercase()
}

/// `POST /logs/{app}`: parse one raw access-log line and append it.
pub async fn ingest_log(
    State(state): State<AppState>,
    Path(app): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let app = normalize(&app);
    let raw = String::from_utf8(body.to_vec())
        .map_err(|_| ApiError::BadRequest("log line is not valid UTF-8".into()))?;

    let observation = state.parser.parse(&raw);
    tracing::debug!(
        request_id = %request_id(&headers),
        app = %app,
        analysed = observation.is_analysed(),
        "Recording access log"
    );
    state.store.record_access_log_async(app, observation).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `GET /logs/{app}`: parsed observations in arrival order.
pub async fn list_logs(State(state): State<AppState>, Path(app): Path<String>) -> Response {
    let logs = state.store.access_logs(&normalize(&app));
    let status = if logs.is_empty() { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(logs)).into_response()
}

/// `GET /rawlogs/{app}`: the raw lines, newline separated.
pub async fn raw_logs(State(state): State<AppState>, Path(app): Path<String>) -> Response {
    let logs = state.store.access_logs(&normalize(&app));
    let body = logs
        .iter()
        .map(Observation::raw_text)
        .collect::<Vec<_>>()
        .join("\n");
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

/// `POST /health/{app}`: overwrite the application's health.
pub async fn report_health(
    State(state): State<AppState>,
    Path(app): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let app = normalize(&app);
    let status: HealthStatus = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("malformed health report: {e}")))?;

    tracing::debug!(
        request_id = %request_id(&headers),
        app = %app,
        status = %status.state,
        "Recording health"
    );
    state.store.record_health_async(app, status).await?;
    Ok(StatusCode::ACCEPTED)
}

/// `GET /health/{app}`: last reported health, UNHEALTHY when never reported.
pub async fn get_health(State(state): State<AppState>, Path(app): Path<String>) -> Json<HealthStatus> {
    Json(state.store.health(&normalize(&app)))
}

/// `GET /`: registered application names.
pub async fn list_apps(State(state): State<AppState>) -> Response {
    let names = state.store.app_names();
    let status = if names.is_empty() { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(names)).into_response()
}

/// `GET /apps`: the full registry.
pub async fn dump_apps(State(state): State<AppState>) -> Response {
    let apps = state.store.apps();
    let status = if apps.is_empty() { StatusCode::NOT_FOUND } else { StatusCode::OK };
    (status, Json(apps)).into_response()
}

/// `GET /analytics/{app}`: per-day counts and forwarded-IP statistics.
pub async fn app_analytics(
    State(state): State<AppState>,
    Path(app): Path<String>,
) -> Result<Response, ApiError> {
    let app = normalize(&app);
    let record = state.store.app(&app).ok_or(ApiError::UnknownApp(app))?;
    Ok(Json(record.analytics(state.parser.zone())).into_response())
}
