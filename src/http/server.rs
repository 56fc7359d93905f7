//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all collector routes
//! - Wire up middleware (tracing, request ID, timeout, body limit, auth)
//! - Serve on a bound listener until shutdown is broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::MondConfig;
use crate::http::handlers;
use crate::http::middleware::{basic_auth_middleware, BasicAuth};
use crate::http::request::{request_id, MakeRequestUuidV4};
use crate::parser::AccessLogParser;
use crate::store::FileStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<FileStore>,
    pub parser: AccessLogParser,
}

/// HTTP server for the collector.
pub struct HttpServer {
    router: Router,
    config: MondConfig,
}

impl HttpServer {
    /// Create a new HTTP server over an opened store.
    pub fn new(config: MondConfig, store: Arc<FileStore>, parser: AccessLogParser) -> Self {
        let auth = Arc::new(BasicAuth::new(config.auth.credentials()));
        if auth.is_enabled() {
            tracing::info!("Basic Auth enabled for dashboard routes");
        }

        let state = AppState { store, parser };
        let router = Self::build_router(&config, state, auth);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &MondConfig, state: AppState, auth: Arc<BasicAuth>) -> Router {
        // Only the dashboard (GET) side is guarded; agents report without credentials.
        let guard = from_fn_with_state(auth, basic_auth_middleware);

        Router::new()
            .route("/", get(handlers::list_apps).layer(guard.clone()))
            .route("/apps", get(handlers::dump_apps).layer(guard.clone()))
            .route("/apps/", get(handlers::dump_apps).layer(guard.clone()))
            .route(
                "/logs/{app}",
                get(handlers::list_logs)
                    .layer(guard.clone())
                    .post(handlers::ingest_log),
            )
            .route("/rawlogs/{app}", get(handlers::raw_logs).layer(guard.clone()))
            .route(
                "/health/{app}",
                get(handlers::get_health)
                    .layer(guard.clone())
                    .post(handlers::report_health),
            )
            .route("/analytics/{app}", get(handlers::app_analytics).layer(guard))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV4))
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a shutdown broadcast is received.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &MondConfig {
        &self.config
    }
}
