//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use crate::config::schema::MondConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the Basic Auth username.
pub const USERNAME_ENV: &str = "MOND_USERNAME";

/// Environment variable overriding the Basic Auth password.
pub const PASSWORD_ENV: &str = "MOND_PW";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Read and parse a TOML file without validating it.
pub fn read_config(path: &Path) -> Result<MondConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<MondConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply `MOND_USERNAME` / `MOND_PW` over the configured credentials.
pub fn apply_env_overrides(config: &mut MondConfig) {
    if let Some(username) = non_empty_env(USERNAME_ENV) {
        config.auth.username = Some(username);
    }
    if let Some(password) = non_empty_env(PASSWORD_ENV) {
        config.auth.password = Some(password);
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
