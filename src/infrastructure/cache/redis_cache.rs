//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::CachedLink;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

const KEY_PREFIX: &str = "link:";

/// Redis cache for short code lookups.
///
/// Entries are JSON-encoded [`CachedLink`] values stored with `SET ... EX`.
/// Errors are returned to the caller, which decides to log and fall back.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self { client: manager })
    }

    fn build_key(short_id: &str) -> String {
        format!("{}{}", KEY_PREFIX, short_id)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_id: &str) -> CacheResult<Option<CachedLink>> {
        let key = Self::build_key(short_id);
        let mut conn = self.client.clone();

        let raw: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("GET {}: {}", key, e)))?;

        match raw {
            Some(raw) => {
                let link = decode_entry(&raw)?;
                debug!(short_id, "Cache HIT");
                Ok(Some(link))
            }
            None => {
                debug!(short_id, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn set_link(
        &self,
        short_id: &str,
        link: &CachedLink,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        let key = Self::build_key(short_id);
        let mut conn = self.client.clone();
        let payload = encode_entry(link)?;

        conn.set_ex::<_, _, ()>(&key, payload, ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        debug!(short_id, ttl_seconds, "Cache SET");
        Ok(())
    }

    async fn invalidate(&self, short_id: &str) -> CacheResult<()> {
        let key = Self::build_key(short_id);
        let mut conn = self.client.clone();

        let deleted: i32 = conn
            .del(&key)
            .await
            .map_err(|e| CacheError::OperationError(format!("DEL {}: {}", key, e)))?;

        if deleted > 0 {
            debug!(short_id, "Cache INVALIDATE");
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

fn encode_entry(link: &CachedLink) -> CacheResult<String> {
    serde_json::to_string(link).map_err(|e| CacheError::InvalidEntry(e.to_string()))
}

fn decode_entry(raw: &str) -> CacheResult<CachedLink> {
    serde_json::from_str(raw).map_err(|e| CacheError::InvalidEntry(e.to_string()))
}
