//! Startup orchestration for the collector.
//!
//! # Responsibilities
//! - Validate configuration
//! - Open the apps store (a corrupt store is fatal)
//! - Bind the listener and serve until shutdown
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when the store is loaded)

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::{validate_config, ValidationError};
use crate::config::MondConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::parser::{parse_zone, zone_from_env, AccessLogParser};
use crate::store::{FileStore, StoreError};

/// Errors that abort collector startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", join(.0))]
    Config(Vec<ValidationError>),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

fn join(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Build the parser from the configured zone, falling back to `TZ`.
pub fn parser_for(config: &MondConfig) -> AccessLogParser {
    let zone = match config.parser.time_zone.as_deref() {
        Some(name) => parse_zone(name).ok(),
        None => zone_from_env(),
    };
    AccessLogParser::new(zone)
}

/// Run the collector until `shutdown` fires.
pub async fn run_collector(config: MondConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    validate_config(&config).map_err(StartupError::Config)?;

    let store = match FileStore::open_path(&config.store.path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(path = %config.store.path, error = %e, "Failed to open apps store");
            return Err(e.into());
        }
    };
    tracing::info!(
        path = %config.store.path,
        apps = store.app_names().len(),
        "Apps store loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.listener.bind_address.clone(),
            source,
        })?;

    let parser = parser_for(&config);
    let server = HttpServer::new(config, store, parser);
    server.run(listener, shutdown.subscribe()).await.map_err(StartupError::Serve)
}
