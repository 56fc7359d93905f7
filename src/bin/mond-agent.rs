//! mond reporting agent.
//!
//! Probes the given targets on an interval and reports the folded health of
//! the application; optionally ships the stdout of a command as raw log lines.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use mond::agent::run_agent;
use mond::config::loader::read_config;
use mond::config::validation::validate_agent_config;
use mond::config::MondConfig;
use mond::lifecycle::signals::wait_for_signal;
use mond::lifecycle::Shutdown;
use mond::observability::logging::{init_logging, LogFormat};
use mond::observability::metrics::init_from_config;

#[derive(Parser)]
#[command(name = "mond-agent", version, about = "Reports website health and log lines to a mond collector")]
struct Cli {
    /// TOML configuration file (the [agent] section is used).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application name to report under.
    #[arg(long)]
    app: Option<String>,

    /// Seconds between probe rounds.
    #[arg(long)]
    interval_secs: Option<u64>,

    /// Per-target probe timeout in seconds, 0 disables it.
    #[arg(long)]
    probe_timeout_secs: Option<u64>,

    /// Command whose stdout lines are reported as access logs.
    #[arg(long, env = "MOND_START_CMD")]
    command: Option<String>,

    /// Collector base URL, e.g. http://localhost:5000.
    report_url: Option<String>,

    /// Websites to probe.
    targets: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match read_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("mond-agent: cannot load {}: {}", path.display(), e);
                return ExitCode::from(2);
            }
        },
        None => MondConfig::default(),
    };
    let observability = config.observability;
    let mut agent = config.agent;

    if let Some(url) = cli.report_url {
        agent.report_url = url;
    }
    if !cli.targets.is_empty() {
        agent.targets = cli.targets;
    }
    if let Some(app) = cli.app {
        agent.app_name = app;
    }
    if let Some(secs) = cli.interval_secs {
        agent.interval_secs = secs;
    }
    if let Some(secs) = cli.probe_timeout_secs {
        agent.probe_timeout_secs = secs;
    }
    if let Some(command) = cli.command.filter(|c| !c.trim().is_empty()) {
        agent.command = Some(command);
    }

    if let Err(errors) = validate_agent_config(&agent) {
        for error in errors {
            eprintln!("mond-agent: {}", error);
        }
        return ExitCode::from(2);
    }

    init_logging(
        "mond_agent",
        &observability.log_level,
        LogFormat::parse(&observability.log_format),
    );
    tracing::info!(
        report_url = %agent.report_url,
        app = %agent.app_name,
        targets = ?agent.targets,
        command = ?agent.command,
        "mond agent starting"
    );
    init_from_config(&observability);

    let shutdown = Arc::new(Shutdown::new());
    let signal_shutdown = Arc::clone(&shutdown);
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    match run_agent(agent, &shutdown).await {
        Ok(()) => {
            tracing::info!("Agent stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Agent failed");
            ExitCode::FAILURE
        }
    }
}
