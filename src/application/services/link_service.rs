//! Link creation and administration service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::clock::Clock;
use crate::domain::entities::{LinkPage, NewShortLink, ShortLink};
use crate::domain::expiry_sweeper;
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::{generate_code, validate_alias};
use crate::utils::url_validator::validate_url;

/// Longest accepted `expire_days`.
pub const MAX_EXPIRE_DAYS: u32 = 3650;

pub const DEFAULT_PER_PAGE: i64 = 20;
pub const MAX_PER_PAGE: i64 = 100;

/// Attempts at inserting a freshly generated code before giving up.
const MAX_GENERATION_ATTEMPTS: usize = 10;

/// Service for creating and administering short links.
///
/// Writes go to the store first; the cache is populated or invalidated
/// afterwards on a best-effort basis.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    clock: Arc<dyn Clock>,
    cache_ttl_seconds: u64,
    base_url: String,
}

impl LinkService {
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        clock: Arc<dyn Clock>,
        cache_ttl_seconds: u64,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            cache,
            clock,
            cache_ttl_seconds,
            base_url: base_url.into(),
        }
    }

    /// Creates a short link.
    ///
    /// # Code Selection
    ///
    /// - With `custom_alias`, the alias is validated and used as is. An alias
    ///   that is already taken yields [`AppError::Conflict`].
    /// - Otherwise an 8-character code is generated. If the store rejects it
    ///   as a duplicate a new one is drawn, up to 10 times.
    ///
    /// # Expiry
    ///
    /// `expire_days` of `None` or `0` creates a permanent link; any other
    /// value sets `expires_at` that many days from now.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for a malformed URL or alias, or an
    /// `expire_days` above [`MAX_EXPIRE_DAYS`].
    ///
    /// Returns [`AppError::Conflict`] if the alias is taken.
    pub async fn create_short_link(
        &self,
        original_url: String,
        custom_alias: Option<String>,
        expire_days: Option<u32>,
    ) -> Result<ShortLink, AppError> {
        validate_url(&original_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        let now = self.clock.now();
        let expires_at = compute_expires_at(now, expire_days)?;

        let link = match custom_alias {
            Some(alias) => self.insert_alias(alias, original_url, expires_at).await?,
            None => self.insert_generated(original_url, expires_at).await?,
        };

        metrics::counter!("links_created_total").increment(1);
        info!(short_id = %link.short_id, expires_at = ?link.expires_at, "Short link created");

        self.populate_cache(&link, now).await;
        Ok(link)
    }

    async fn insert_alias(
        &self,
        alias: String,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink, AppError> {
        validate_alias(&alias)?;

        if self.repository.find_by_short_id(&alias).await?.is_some() {
            return Err(alias_taken(&alias));
        }

        let new_link = NewShortLink {
            short_id: alias.clone(),
            original_url,
            expires_at,
        };

        // A concurrent creator may have taken the alias since the check above.
        match self.repository.insert(new_link).await {
            Err(AppError::Conflict { .. }) => Err(alias_taken(&alias)),
            other => other,
        }
    }

    async fn insert_generated(
        &self,
        original_url: String,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let new_link = NewShortLink {
                short_id: generate_code(),
                original_url: original_url.clone(),
                expires_at,
            };

            match self.repository.insert(new_link).await {
                Err(AppError::Conflict { .. }) => {
                    debug!(attempt, "Generated code collided, retrying");
                }
                other => return other,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "reason": "Too many collisions" }),
        ))
    }

    /// Lists links newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `page < 1` or `per_page` is outside
    /// `1..=100`.
    pub async fn list_links(
        &self,
        page: i64,
        per_page: i64,
        query: Option<String>,
    ) -> Result<LinkPage, AppError> {
        if page < 1 {
            return Err(AppError::bad_request(
                "page must be at least 1",
                json!({ "page": page }),
            ));
        }
        if !(1..=MAX_PER_PAGE).contains(&per_page) {
            return Err(AppError::bad_request(
                format!("perPage must be between 1 and {}", MAX_PER_PAGE),
                json!({ "perPage": per_page }),
            ));
        }

        let offset = (page - 1).saturating_mul(per_page);
        let filter = LinkFilter::new(offset, per_page).with_search(query);
        let total = self.repository.count(filter.search.clone()).await?;
        let items = self.repository.list(filter).await?;

        Ok(LinkPage {
            items,
            total,
            page,
            per_page,
        })
    }

    /// Returns a link regardless of its active or expiry state.
    pub async fn get_link(&self, short_id: &str) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_short_id(short_id)
            .await?
            .ok_or_else(|| not_found(short_id))
    }

    /// Activates or deactivates a link and drops its cache entry.
    pub async fn set_active(&self, short_id: &str, is_active: bool) -> Result<ShortLink, AppError> {
        let link = self
            .repository
            .set_active(short_id, is_active)
            .await?
            .ok_or_else(|| not_found(short_id))?;

        self.invalidate_cache(short_id).await;
        info!(short_id, is_active, "Link status updated");
        Ok(link)
    }

    /// Physically deletes a link and drops its cache entry.
    pub async fn delete_link(&self, short_id: &str) -> Result<(), AppError> {
        if !self.repository.delete(short_id).await? {
            return Err(not_found(short_id));
        }

        self.invalidate_cache(short_id).await;
        info!(short_id, "Link deleted");
        Ok(())
    }

    /// Runs one expiry sweep and returns how many links were removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        expiry_sweeper::purge_expired(self.repository.as_ref(), self.clock.as_ref()).await
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, short_id: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), short_id)
    }

    /// Checks that the store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    async fn populate_cache(&self, link: &ShortLink, now: DateTime<Utc>) {
        let cached = link.to_cached();
        let Some(ttl) = cached.ttl_seconds(now, self.cache_ttl_seconds) else {
            return;
        };

        if let Err(e) = self.cache.set_link(&link.short_id, &cached, ttl).await {
            metrics::counter!("cache_errors_total").increment(1);
            warn!(short_id = %link.short_id, error = %e, "Failed to cache new link");
        }
    }

    async fn invalidate_cache(&self, short_id: &str) {
        if let Err(e) = self.cache.invalidate(short_id).await {
            metrics::counter!("cache_errors_total").increment(1);
            warn!(short_id, error = %e, "Failed to invalidate cache entry");
        }
    }
}

fn compute_expires_at(
    now: DateTime<Utc>,
    expire_days: Option<u32>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match expire_days {
        None | Some(0) => Ok(None),
        Some(days) if days > MAX_EXPIRE_DAYS => Err(AppError::bad_request(
            format!("expireDays must be at most {}", MAX_EXPIRE_DAYS),
            json!({ "expireDays": days }),
        )),
        Some(days) => Ok(Some(now + Duration::days(i64::from(days)))),
    }
}

fn alias_taken(alias: &str) -> AppError {
    AppError::conflict("Alias already exists", json!({ "short_id": alias }))
}

fn not_found(short_id: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "short_id": short_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use crate::utils::code_generator::GENERATED_CODE_LENGTH;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn stored(new_link: NewShortLink) -> ShortLink {
        ShortLink {
            id: 1,
            short_id: new_link.short_id,
            original_url: new_link.original_url,
            clicks: 0,
            is_active: true,
            expires_at: new_link.expires_at,
            created_at: fixed_now(),
        }
    }

    fn service(repo: MockLinkRepository, cache: MockCacheService) -> LinkService {
        LinkService::new(
            Arc::new(repo),
            Arc::new(cache),
            Arc::new(ManualClock::new(fixed_now())),
            3600,
            "https://sho.rt/",
        )
    }

    fn accepting_cache() -> MockCacheService {
        let mut cache = MockCacheService::new();
        cache.expect_set_link().returning(|_, _, _| Ok(()));
        cache.expect_invalidate().returning(|_| Ok(()));
        cache
    }

    #[tokio::test]
    async fn test_create_with_generated_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|l| l.short_id.len() == GENERATED_CODE_LENGTH && l.expires_at.is_none())
            .times(1)
            .returning(|l| Ok(stored(l)));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_link()
            .withf(|_, cached, ttl| cached.original_url == "https://example.com/a" && *ttl == 3600)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let link = service(repo, cache)
            .create_short_link("https://example.com/a".to_string(), None, None)
            .await
            .unwrap();

        assert_eq!(link.short_id.len(), GENERATED_CODE_LENGTH);
        assert_eq!(link.clicks, 0);
        assert!(link.is_active);
    }

    #[tokio::test]
    async fn test_create_with_alias_and_expiry() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id()
            .withf(|id| id == "demo")
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_insert()
            .withf(|l| l.short_id == "demo")
            .times(1)
            .returning(|l| Ok(stored(l)));

        let link = service(repo, accepting_cache())
            .create_short_link(
                "https://example.com/a".to_string(),
                Some("demo".to_string()),
                Some(7),
            )
            .await
            .unwrap();

        assert_eq!(link.short_id, "demo");
        assert_eq!(link.expires_at, Some(fixed_now() + Duration::days(7)));
    }

    #[tokio::test]
    async fn test_zero_expire_days_is_permanent() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .withf(|l| l.expires_at.is_none())
            .times(1)
            .returning(|l| Ok(stored(l)));

        let link = service(repo, accepting_cache())
            .create_short_link("https://example.com".to_string(), None, Some(0))
            .await
            .unwrap();

        assert!(link.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_expire_days_above_limit_rejected() {
        let repo = MockLinkRepository::new();

        let result = service(repo, MockCacheService::new())
            .create_short_link(
                "https://example.com".to_string(),
                None,
                Some(MAX_EXPIRE_DAYS + 1),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().times(0);

        let result = service(repo, MockCacheService::new())
            .create_short_link("javascript:alert(1)".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_invalid_alias_rejected() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().times(0);

        let result = service(repo, MockCacheService::new())
            .create_short_link(
                "https://example.com".to_string(),
                Some("bad alias".to_string()),
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_taken_alias_conflicts_before_insert() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().times(1).returning(|id| {
            Ok(Some(stored(NewShortLink {
                short_id: id.to_string(),
                original_url: "https://other.com".to_string(),
                expires_at: None,
            })))
        });
        repo.expect_insert().times(0);

        let result = service(repo, MockCacheService::new())
            .create_short_link(
                "https://example.com".to_string(),
                Some("taken".to_string()),
                None,
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_alias_race_lost_at_insert_is_conflict() {
        let mut repo = MockLinkRepository::new();
        repo.expect_find_by_short_id().returning(|_| Ok(None));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(repo, MockCacheService::new())
            .create_short_link(
                "https://example.com".to_string(),
                Some("racy".to_string()),
                None,
            )
            .await;

        match result {
            Err(AppError::Conflict { message, .. }) => assert_eq!(message, "Alias already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generated_code_collision_is_retried() {
        let mut seq = mockall::Sequence::new();
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));
        repo.expect_insert()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|l| Ok(stored(l)));

        let result = service(repo, accepting_cache())
            .create_short_link("https://example.com".to_string(), None, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generated_code_gives_up_after_max_attempts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Unique constraint violation", json!({}))));

        let result = service(repo, MockCacheService::new())
            .create_short_link("https://example.com".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_cache_failure_does_not_fail_creation() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert().returning(|l| Ok(stored(l)));

        let mut cache = MockCacheService::new();
        cache
            .expect_set_link()
            .times(1)
            .returning(|_, _, _| Err(CacheError::OperationError("down".to_string())));

        let result = service(repo, cache)
            .create_short_link("https://example.com".to_string(), None, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_insert()
            .returning(|_| Err(AppError::unavailable("Database unavailable", json!({}))));

        let result = service(repo, MockCacheService::new())
            .create_short_link("https://example.com".to_string(), None, None)
            .await;

        assert!(matches!(result, Err(AppError::Unavailable { .. })));
    }

    #[tokio::test]
    async fn test_list_links_computes_offset() {
        let mut repo = MockLinkRepository::new();
        repo.expect_count()
            .withf(|q| q.as_deref() == Some("demo"))
            .returning(|_| Ok(42));
        repo.expect_list()
            .withf(|f| f.offset == 20 && f.limit == 10 && f.search.as_deref() == Some("demo"))
            .returning(|_| Ok(vec![]));

        let page = service(repo, MockCacheService::new())
            .list_links(3, 10, Some("demo".to_string()))
            .await
            .unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.page, 3);
        assert_eq!(page.per_page, 10);
    }

    #[tokio::test]
    async fn test_list_links_rejects_bad_window() {
        let svc = service(MockLinkRepository::new(), MockCacheService::new());

        assert!(matches!(
            svc.list_links(0, 20, None).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            svc.list_links(1, 0, None).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            svc.list_links(1, MAX_PER_PAGE + 1, None).await,
            Err(AppError::Validation { .. })
        ));
    }

    #[tokio::test]
    async fn test_set_active_invalidates_cache() {
        let mut repo = MockLinkRepository::new();
        repo.expect_set_active()
            .withf(|id, active| id == "demo" && !*active)
            .returning(|id, active| {
                let mut link = stored(NewShortLink {
                    short_id: id.to_string(),
                    original_url: "https://example.com".to_string(),
                    expires_at: None,
                });
                link.is_active = active;
                Ok(Some(link))
            });

        let mut cache = MockCacheService::new();
        cache
            .expect_invalidate()
            .withf(|id| id == "demo")
            .times(1)
            .returning(|_| Ok(()));

        let link = service(repo, cache).set_active("demo", false).await.unwrap();
        assert!(!link.is_active);
    }

    #[tokio::test]
    async fn test_set_active_unknown_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_set_active().returning(|_, _| Ok(None));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().times(0);

        let result = service(repo, cache).set_active("nope", true).await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete()
            .withf(|id| id == "demo")
            .returning(|_| Ok(true));

        let mut cache = MockCacheService::new();
        cache.expect_invalidate().times(1).returning(|_| Ok(()));

        assert!(service(repo, cache).delete_link("demo").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_unknown_link() {
        let mut repo = MockLinkRepository::new();
        repo.expect_delete().returning(|_| Ok(false));

        let result = service(repo, MockCacheService::new())
            .delete_link("nope")
            .await;
        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[test]
    fn test_short_url_trims_trailing_slash() {
        let svc = service(MockLinkRepository::new(), MockCacheService::new());
        assert_eq!(svc.short_url("demo"), "https://sho.rt/demo");
    }
}
