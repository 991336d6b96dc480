//! Redis-backed exhaustion store
//!
//! One record per provider, `SET <key> 1 EX 86400`. Redis owns the TTL,
//! so multiple gateway instances sharing a Redis see a consistent
//! (eventually consistent, not linearizable) view of exhausted
//! providers.

use super::{exhaustion_key, ExhaustionStore, StoreError, EXHAUSTION_TTL};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::info;

/// Exhaustion store shared across gateway instances via Redis
#[derive(Clone)]
pub struct RedisExhaustionStore {
    conn: ConnectionManager,
}

impl RedisExhaustionStore {
    /// Connect to Redis and return a store handle.
    ///
    /// The connection manager reconnects on failure, so a handle stays
    /// usable across Redis restarts.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        info!("connected to exhaustion store");
        Ok(Self { conn })
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

#[async_trait]
impl ExhaustionStore for RedisExhaustionStore {
    async fn mark_exhausted(&self, provider: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(exhaustion_key(provider), "1", EXHAUSTION_TTL.as_secs())
            .await?;
        Ok(())
    }

    async fn is_exhausted(&self, provider: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let exists: bool = conn.exists(exhaustion_key(provider)).await?;
        Ok(exists)
    }
}
