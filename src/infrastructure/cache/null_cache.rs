//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::CachedLink;
use async_trait::async_trait;
use tracing::debug;

/// A cache that never stores anything.
///
/// Used when Redis is not configured or unreachable at startup; every lookup
/// is a miss, so resolution goes straight to the store.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_link(&self, _short_id: &str) -> CacheResult<Option<CachedLink>> {
        Ok(None)
    }

    async fn set_link(
        &self,
        _short_id: &str,
        _link: &CachedLink,
        _ttl_seconds: u64,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_id: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "disabled"
    }
}
