//! Configuration module for llmgate
//!
//! Provides the configuration schema and validation for the gateway:
//! the provider pool, the exhaustion store backend, and connection
//! settings. Configuration can come from a YAML or JSON file or, for
//! container deployments, directly from the process environment.

mod env;
mod error;
mod schema;
mod secrets;

pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{ConnectionConfig, GatewayConfig, ProviderConfig, ServerConfig, StoreConfig};
pub use secrets::SecretString;

use std::fs;
use std::path::Path;

/// Environment variable holding the provider pool as a JSON array
pub const PROVIDERS_JSON_VAR: &str = "PROVIDERS_JSON";

/// Environment variable holding the Redis connection string
pub const REDIS_URL_VAR: &str = "REDIS_URL";

/// Environment variable overriding the listen address
pub const LISTEN_ADDR_VAR: &str = "LISTEN_ADDR";

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<GatewayConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    // Interpolate environment variables before parsing
    let interpolated = env::interpolate_env_vars(&content)?;

    let mut config: GatewayConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    env::interpolate_config_env_vars(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<GatewayConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let interpolated = env::interpolate_env_vars(&content)?;

    let mut config: GatewayConfig =
        serde_json::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: path.to_string_lossy().to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    env::interpolate_config_env_vars(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration from the process environment.
///
/// `PROVIDERS_JSON` must hold a JSON array of provider objects
/// (`{"name", "base_url", "api_key"}`); `REDIS_URL` and `LISTEN_ADDR`
/// are optional.
pub fn load_from_env() -> Result<GatewayConfig, ConfigError> {
    let providers_json =
        std::env::var(PROVIDERS_JSON_VAR).map_err(|_| ConfigError::EnvVarNotFound {
            var: PROVIDERS_JSON_VAR.to_string(),
        })?;

    let providers: Vec<ProviderConfig> =
        serde_json::from_str(&providers_json).map_err(|e| ConfigError::ParseError {
            path: PROVIDERS_JSON_VAR.to_string(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })?;

    let mut config = GatewayConfig {
        providers,
        store: StoreConfig {
            redis_url: std::env::var(REDIS_URL_VAR).ok(),
        },
        server: ServerConfig::default(),
        connection: ConnectionConfig::default(),
    };

    if let Ok(addr) = std::env::var(LISTEN_ADDR_VAR) {
        config.server.listen_addr = addr;
    }

    env::interpolate_config_env_vars(&mut config)?;
    config.validate()?;
    Ok(config)
}
