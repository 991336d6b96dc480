//! Configuration schema structures with serde support

use super::error::{ValidationError, ValidationErrorKind};
use super::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Root configuration structure for the gateway
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Ordered list of upstream providers; order defines rotation order
    pub providers: Vec<ProviderConfig>,

    /// Exhaustion store backend settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Inbound listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound connection settings
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// One upstream provider endpoint with its credential
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Unique provider name (used as the exhaustion store key suffix)
    pub name: String,

    /// Base URL for the provider API
    pub base_url: String,

    /// API key (supports environment variable interpolation)
    pub api_key: SecretString,
}

/// Exhaustion store backend configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Redis connection string. When absent an in-process store is used,
    /// which does not share exhaustion state across instances.
    #[serde(default)]
    pub redis_url: Option<String>,
}

/// Inbound listener configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind, e.g. "0.0.0.0:8000"
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// Outbound connection configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Connection timeout in milliseconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    /// Total request timeout in milliseconds. `None` leaves outbound
    /// calls unbounded, which streaming relays require.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Maximum idle connections per host
    #[serde(default = "default_max_idle")]
    pub max_idle_per_host: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout(),
            request_timeout_ms: None,
            max_idle_per_host: default_max_idle(),
        }
    }
}

// Default value functions for serde
fn default_listen_addr() -> String {
    "0.0.0.0:8000".to_string()
}
fn default_connect_timeout() -> u64 {
    10000
}
fn default_max_idle() -> usize {
    10
}

impl GatewayConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.providers.is_empty() {
            return Err(ValidationError::required("providers")
                .with_context("At least one provider must be configured"));
        }

        // Duplicate names would collide in the exhaustion store
        let mut seen_names = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            if !seen_names.insert(&provider.name) {
                return Err(ValidationError::duplicate(
                    format!("providers[{}].name", i),
                    provider.name.clone(),
                ));
            }

            provider.validate(&format!("providers[{}]", i))?;
        }

        Ok(())
    }
}

impl ProviderConfig {
    /// Validate provider configuration
    pub fn validate(&self, path: &str) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::required(format!("{}.name", path)));
        }

        if self.api_key.is_empty() {
            return Err(ValidationError::required(format!("{}.api_key", path)));
        }

        if self.base_url.is_empty() {
            return Err(ValidationError::required(format!("{}.base_url", path)));
        }

        match url::Url::parse(&self.base_url) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    return Err(ValidationError::new(
                        format!("{}.base_url", path),
                        ValidationErrorKind::InvalidUrl {
                            message: format!(
                                "URL scheme must be http or https, got: {}",
                                url.scheme()
                            ),
                        },
                    ));
                }
            }
            Err(e) => {
                return Err(ValidationError::new(
                    format!("{}.base_url", path),
                    ValidationErrorKind::InvalidUrl {
                        message: e.to_string(),
                    },
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            base_url: format!("https://{}.example.com/v1", name),
            api_key: SecretString::new("sk-test"),
        }
    }

    fn config(providers: Vec<ProviderConfig>) -> GatewayConfig {
        GatewayConfig {
            providers,
            store: StoreConfig::default(),
            server: ServerConfig::default(),
            connection: ConnectionConfig::default(),
        }
    }

    #[test]
    fn test_valid_config() {
        let cfg = config(vec![provider("alpha"), provider("beta")]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_provider_list_rejected() {
        let cfg = config(vec![]);
        let err = cfg.validate().unwrap_err();
        assert_eq!(err.field_path, "providers");
    }

    #[test]
    fn test_duplicate_provider_names_rejected() {
        let cfg = config(vec![provider("alpha"), provider("alpha")]);
        let err = cfg.validate().unwrap_err();
        assert!(matches!(
            err.kind,
            ValidationErrorKind::DuplicateValue { ref value } if value == "alpha"
        ));
    }

    #[test]
    fn test_non_http_url_rejected() {
        let mut p = provider("alpha");
        p.base_url = "ftp://alpha.example.com".to_string();
        let err = config(vec![p]).validate().unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut p = provider("alpha");
        p.api_key = SecretString::new("");
        let err = config(vec![p]).validate().unwrap_err();
        assert_eq!(err.field_path, "providers[0].api_key");
    }
}
