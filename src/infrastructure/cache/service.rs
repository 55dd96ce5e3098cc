//! Cache service trait and error types.

use crate::domain::entities::CachedLink;
use async_trait::async_trait;

/// Errors that can occur during cache operations.
///
/// These never reach HTTP callers: the services log them and fall back to
/// the store.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Cache entry is malformed: {0}")]
    InvalidEntry(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short code lookups.
///
/// Values are [`CachedLink`] tuples rather than bare URLs so that a hit can
/// be re-validated without touching the store.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached tuple for `short_id`, or `None` on a miss.
    async fn get_link(&self, short_id: &str) -> CacheResult<Option<CachedLink>>;

    /// Stores `link` under `short_id` for `ttl_seconds`.
    async fn set_link(&self, short_id: &str, link: &CachedLink, ttl_seconds: u64)
    -> CacheResult<()>;

    /// Removes a cached entry. Used when a link is deactivated or deleted.
    async fn invalidate(&self, short_id: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Human-readable backend name for health reports.
    fn backend_name(&self) -> &'static str;
}
