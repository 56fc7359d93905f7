//! mond collector.
//!
//! # Architecture Overview
//!
//! ```text
//!    mond-agent                      ┌──────────────────────────────────────────┐
//!    ──────────                      │                 COLLECTOR                │
//!    POST /logs/{app}   raw line ───▶│  http ──▶ parser ──▶ store (RwLock) ──┐  │
//!    POST /health/{app} status  ───▶│  http ─────────────▶ store           │  │
//!                                    │                                       ▼  │
//!    dashboard                       │                            apps.db.json  │
//!    GET /, /apps, /logs, /health ◀──│  http (Basic Auth) ◀── store snapshots   │
//!                                    └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use mond::config::loader::{apply_env_overrides, read_config};
use mond::config::MondConfig;
use mond::lifecycle::signals::wait_for_signal;
use mond::lifecycle::{run_collector, Shutdown};
use mond::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "mond", version, about = "Collects access logs and health reports from mond agents")]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "MOND_CONFIG")]
    config: Option<PathBuf>,

    /// Path of the JSON apps database.
    #[arg(long)]
    db: Option<String>,

    /// Listen address, e.g. 0.0.0.0:5000.
    #[arg(long)]
    bind: Option<String>,

    /// IANA zone for access-log timestamps without an offset.
    #[arg(long)]
    time_zone: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match read_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("mond: cannot load {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => MondConfig::default(),
    };
    apply_env_overrides(&mut config);
    if let Some(db) = cli.db {
        config.store.path = db;
    }
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    if cli.time_zone.is_some() {
        config.parser.time_zone = cli.time_zone;
    }

    init_logging(
        "mond",
        &config.observability.log_level,
        LogFormat::parse(&config.observability.log_format),
    );
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mond collector starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        store = %config.store.path,
        auth = config.auth.credentials().is_some(),
        "Configuration loaded"
    );

    mond::observability::metrics::init_from_config(&config.observability);

    let shutdown = Arc::new(Shutdown::new());
    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    match run_collector(config, &shutdown).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Collector failed");
            ExitCode::FAILURE
        }
    }
}
