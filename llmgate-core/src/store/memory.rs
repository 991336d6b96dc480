//! In-process exhaustion store
//!
//! Backed by a mutex-guarded map of expiry instants with lazy expiry:
//! an entry past its deadline is treated as absent and dropped on the
//! next read. Uses `tokio::time::Instant` so tests can drive the clock
//! with `tokio::time::pause`/`advance`.

use super::{ExhaustionStore, StoreError, EXHAUSTION_TTL};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Exhaustion store local to one process
pub struct MemoryExhaustionStore {
    entries: Mutex<HashMap<String, Instant>>,
    ttl: Duration,
}

impl MemoryExhaustionStore {
    pub fn new() -> Self {
        Self::with_ttl(EXHAUSTION_TTL)
    }

    /// Store with a custom TTL, for tests
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }
}

impl Default for MemoryExhaustionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExhaustionStore for MemoryExhaustionStore {
    async fn mark_exhausted(&self, provider: &str) -> Result<(), StoreError> {
        let expiry = Instant::now() + self.ttl;
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        entries.insert(provider.to_string(), expiry);
        Ok(())
    }

    async fn is_exhausted(&self, provider: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match entries.get(provider) {
            Some(expiry) if *expiry > now => Ok(true),
            Some(_) => {
                // Lazy expiry
                entries.remove(provider);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
