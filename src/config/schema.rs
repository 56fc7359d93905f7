//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the collector
//! and the reporting agent. All types derive Serde traits for deserialization
//! from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MondConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Persistence settings.
    pub store: StoreConfig,

    /// Optional Basic Auth for dashboard routes.
    pub auth: AuthConfig,

    /// Access-log parser settings.
    pub parser: ParserConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Reporting agent settings.
    pub agent: AgentConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON apps database.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "apps.db.json".to_string(),
        }
    }
}

/// Basic Auth credentials. Both or neither must be set.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl AuthConfig {
    /// Credentials, when both parts are configured.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        }
    }
}

/// Access-log parser configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ParserConfig {
    /// IANA zone for timestamps without a usable offset (falls back to `TZ`).
    pub time_zone: Option<String>,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format (pretty, compact, json).
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Reporting agent configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Collector base URL.
    pub report_url: String,

    /// Application name reported under.
    pub app_name: String,

    /// URLs probed every interval.
    pub targets: Vec<String>,

    /// Probe interval in seconds.
    pub interval_secs: u64,

    /// Per-target probe timeout in seconds (0 disables).
    pub probe_timeout_secs: u64,

    /// Command whose stdout is shipped as raw log lines.
    pub command: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            report_url: "http://localhost:5000".to_string(),
            app_name: "test".to_string(),
            targets: Vec::new(),
            interval_secs: 5,
            probe_timeout_secs: 10,
            command: None,
        }
    }
}
