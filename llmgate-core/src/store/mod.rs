//! Exhaustion store: shared TTL-based flags for exhausted providers
//!
//! A marked provider is skipped by the selector until its record
//! expires. The trait seam keeps the selector and the retry loop
//! testable without a network backend; production deployments use the
//! Redis implementation so exhaustion state is shared across instances.

mod memory;
mod redis;

pub use self::memory::MemoryExhaustionStore;
pub use self::redis::RedisExhaustionStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Key prefix for exhaustion records
pub const EXHAUSTION_KEY_PREFIX: &str = "provider_exhausted:";

/// How long a provider stays marked after a quota exhaustion signal
pub const EXHAUSTION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Store key for a provider's exhaustion record
pub fn exhaustion_key(provider: &str) -> String {
    format!("{}{}", EXHAUSTION_KEY_PREFIX, provider)
}

/// Errors from the store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to exhaustion store: {0}")]
    Connection(String),

    #[error("Exhaustion store backend error: {0}")]
    Backend(String),
}

/// Shared, TTL-based flag store recording which providers are exhausted
#[async_trait]
pub trait ExhaustionStore: Send + Sync {
    /// Mark a provider exhausted, setting or refreshing its 24-hour TTL.
    /// Idempotent: re-marking an already-exhausted provider just resets
    /// the expiry.
    async fn mark_exhausted(&self, provider: &str) -> Result<(), StoreError>;

    /// True iff a non-expired record exists for the provider
    async fn is_exhausted(&self, provider: &str) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_key_layout() {
        assert_eq!(exhaustion_key("openai"), "provider_exhausted:openai");
    }

    #[test]
    fn test_ttl_is_24_hours() {
        assert_eq!(EXHAUSTION_TTL.as_secs(), 86400);
    }
}
