//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs, zones and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Collector and agent sections are validated separately; each binary only
//!   checks the part it uses

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::{AgentConfig, MondConfig};
use crate::parser::parse_zone;

/// One failed semantic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate the collector-side configuration.
pub fn validate_config(config: &MondConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be greater than 0"));
    }
    if config.store.path.trim().is_empty() {
        errors.push(ValidationError::new("store.path", "must not be empty"));
    }
    match (&config.auth.username, &config.auth.password) {
        (Some(_), None) | (None, Some(_)) => {
            errors.push(ValidationError::new("auth", "username and password must be set together"));
        }
        (Some(user), Some(_)) if user.contains(':') => {
            errors.push(ValidationError::new("auth.username", "must not contain ':'"));
        }
        _ => {}
    }
    if let Some(zone) = &config.parser.time_zone {
        if let Err(e) = parse_zone(zone) {
            errors.push(ValidationError::new("parser.time_zone", e));
        }
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the agent section.
pub fn validate_agent_config(agent: &AgentConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = Url::parse(&agent.report_url) {
        errors.push(ValidationError::new(
            "agent.report_url",
            format!("'{}' is not a URL: {}", agent.report_url, e),
        ));
    }
    if agent.app_name.trim().is_empty() || agent.app_name.contains('/') {
        errors.push(ValidationError::new("agent.app_name", "must be a non-empty path segment"));
    }
    if agent.targets.is_empty() {
        errors.push(ValidationError::new("agent.targets", "at least one target is required"));
    }
    for target in &agent.targets {
        if let Err(e) = Url::parse(target) {
            errors.push(ValidationError::new(
                "agent.targets",
                format!("'{}' is not a URL: {}", target, e),
            ));
        }
    }
    if agent.interval_secs == 0 {
        errors.push(ValidationError::new("agent.interval_secs", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
