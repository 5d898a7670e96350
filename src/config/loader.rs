//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{GatewayConfig, PRIMARY_NETWORK};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding the primary network RPC URL.
pub const RPC_URL_ENV_VAR: &str = "GATEWAY_RPC_URL";

/// Environment variable overriding the listener bind address.
pub const BIND_ADDRESS_ENV_VAR: &str = "GATEWAY_BIND_ADDRESS";

/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV_VAR: &str = "GATEWAY_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load configuration for the running process.
///
/// Reads the optional TOML file, applies environment overrides, then validates.
pub fn load_from_env(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    let config = apply_env_overrides(config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using the given lookup.
///
/// - `GATEWAY_RPC_URL` sets the primary network endpoint.
/// - `GATEWAY_<NETWORK>_RPC_URL` sets the endpoint of any configured network.
/// - `GATEWAY_BIND_ADDRESS` sets the listener, otherwise `PORT` binds `0.0.0.0:<PORT>`.
/// - `GATEWAY_LOG_LEVEL` sets the log level.
pub fn apply_env_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    for (name, network) in config.networks.iter_mut() {
        let key = format!("GATEWAY_{}_RPC_URL", name.to_ascii_uppercase());
        if let Some(url) = lookup(&key) {
            tracing::debug!(network = %name, "RPC URL overridden from environment");
            network.rpc_url = url;
        }
    }

    if let Some(url) = lookup(RPC_URL_ENV_VAR) {
        if let Some(primary) = config.networks.get_mut(PRIMARY_NETWORK) {
            primary.rpc_url = url;
        }
    }

    if let Some(bind) = lookup(BIND_ADDRESS_ENV_VAR) {
        config.listener.bind_address = bind;
    } else if let Some(port) = lookup("PORT") {
        config.listener.bind_address = format!("0.0.0.0:{}", port);
    }

    if let Some(level) = lookup(LOG_LEVEL_ENV_VAR) {
        config.observability.log_level = level;
    }

    config
}
