//! Immutable, ordered registry of upstream providers
//!
//! Registry order is significant: it defines the rotation order used by
//! the selector. The registry is built once at startup and never
//! mutated afterwards.

use crate::config::{ProviderConfig, SecretString};
use std::collections::HashSet;
use thiserror::Error;

/// Errors raised while building the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Provider pool is empty")]
    EmptyPool,

    /// Duplicate names would collide on the exhaustion store key
    #[error("Duplicate provider name: {name}")]
    DuplicateName { name: String },
}

/// One configured upstream endpoint with its credential
#[derive(Debug, Clone)]
pub struct Provider {
    name: String,
    base_url: String,
    api_key: SecretString,
}

impl Provider {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<SecretString>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Unique provider name; also the exhaustion store key suffix
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base URL the original path and query are appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credential used to overwrite the inbound `Authorization` header
    pub fn api_key(&self) -> &SecretString {
        &self.api_key
    }
}

impl From<&ProviderConfig> for Provider {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            name: config.name.clone(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }
}

/// Fixed-size, ordered provider pool
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Build a registry from an ordered provider list.
    ///
    /// Fails on an empty list or duplicate provider names.
    pub fn new(providers: Vec<Provider>) -> Result<Self, RegistryError> {
        if providers.is_empty() {
            return Err(RegistryError::EmptyPool);
        }

        let mut seen = HashSet::new();
        for provider in &providers {
            if !seen.insert(provider.name.as_str()) {
                return Err(RegistryError::DuplicateName {
                    name: provider.name.clone(),
                });
            }
        }

        Ok(Self { providers })
    }

    /// Build a registry from validated configuration
    pub fn from_config(configs: &[ProviderConfig]) -> Result<Self, RegistryError> {
        Self::new(configs.iter().map(Provider::from).collect())
    }

    /// Number of providers in the pool
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider at a rotation position
    pub fn get(&self, index: usize) -> Option<&Provider> {
        self.providers.get(index)
    }

    /// Providers in rotation order
    pub fn iter(&self) -> impl Iterator<Item = &Provider> {
        self.providers.iter()
    }
}
