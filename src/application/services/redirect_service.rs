//! Short code resolution with a read-through cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::clock::Clock;
use crate::domain::entities::{CachedLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Resolves short codes to their destination URLs.
///
/// # Lookup Order
///
/// 1. Cache. A hit is re-validated against the current time and the cached
///    active flag; an entry that no longer validates is dropped.
/// 2. Store, on a miss or cache error. The result is written back to the
///    cache with a TTL no longer than the link's remaining lifetime.
///
/// Every successful resolution enqueues one [`ClickEvent`] without waiting.
pub struct RedirectService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    click_sender: mpsc::Sender<ClickEvent>,
    cache_ttl_seconds: u64,
}

impl RedirectService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        click_sender: mpsc::Sender<ClickEvent>,
        cache_ttl_seconds: u64,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            click_sender,
            cache_ttl_seconds,
        }
    }

    /// Resolves `short_id` to its original URL and records a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown, inactive or
    /// expired. The three cases are reported identically.
    ///
    /// Returns the store's error if the cache misses and the store fails.
    pub async fn resolve(&self, short_id: &str) -> Result<String, AppError> {
        let now = self.clock.now();

        let original_url = match self.lookup_cache(short_id, now).await {
            CacheLookup::Hit(url) => url,
            CacheLookup::Stale => return Err(not_found(short_id)),
            CacheLookup::Miss => {
                let link = self
                    .repository
                    .find_by_short_id(short_id)
                    .await?
                    .filter(|link| link.is_resolvable_at(now))
                    .ok_or_else(|| not_found(short_id))?;

                self.populate_cache(&link, now).await;
                link.original_url
            }
        };

        self.record_click(short_id);
        Ok(original_url)
    }

    async fn lookup_cache(&self, short_id: &str, now: DateTime<Utc>) -> CacheLookup {
        match self.cache.get_link(short_id).await {
            Ok(Some(cached)) if cached.is_resolvable_at(now) => {
                metrics::counter!("cache_hits_total").increment(1);
                CacheLookup::Hit(cached.original_url)
            }
            Ok(Some(_)) => {
                metrics::counter!("cache_hits_total").increment(1);
                debug!(short_id, "Cached link no longer valid");
                if let Err(e) = self.cache.invalidate(short_id).await {
                    metrics::counter!("cache_errors_total").increment(1);
                    warn!(short_id, error = %e, "Failed to invalidate stale cache entry");
                }
                CacheLookup::Stale
            }
            Ok(None) => {
                metrics::counter!("cache_misses_total").increment(1);
                CacheLookup::Miss
            }
            Err(e) => {
                metrics::counter!("cache_errors_total").increment(1);
                warn!(short_id, error = %e, "Cache lookup failed, falling back to store");
                CacheLookup::Miss
            }
        }
    }

    async fn populate_cache(&self, link: &ShortLink, now: DateTime<Utc>) {
        let cached: CachedLink = link.to_cached();
        let Some(ttl) = cached.ttl_seconds(now, self.cache_ttl_seconds) else {
            return;
        };

        if let Err(e) = self.cache.set_link(&link.short_id, &cached, ttl).await {
            metrics::counter!("cache_errors_total").increment(1);
            warn!(short_id = %link.short_id, error = %e, "Failed to cache link");
        }
    }

    fn record_click(&self, short_id: &str) {
        match self.click_sender.try_send(ClickEvent::new(short_id)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(short_id, "Click queue full, dropping click");
            }
            Err(TrySendError::Closed(_)) => {
                metrics::counter!("clicks_dropped_total").increment(1);
                warn!(short_id, "Click queue closed, dropping click");
            }
        }
    }
}

enum CacheLookup {
    Hit(String),
    /// Entry found but the link is inactive or expired.
    Stale,
    Miss,
}

fn not_found(short_id: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_id": short_id }))
}
