#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use shortlink::application::services::{AuthService, LinkService, RedirectService};
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::clock::{Clock, ManualClock};
use shortlink::domain::entities::{CachedLink, NewShortLink, ShortLink};
use shortlink::domain::repositories::{LinkFilter, LinkRepository};
use shortlink::error::AppError;
use shortlink::infrastructure::cache::{CacheError, CacheResult, CacheService};
use shortlink::routes::{RouterOptions, build_router};
use shortlink::state::AppState;

pub const ADMIN_KEY: &str = "test-admin-key";
pub const BASE_URL: &str = "http://sho.rt";
pub const CACHE_TTL_SECONDS: u64 = 3600;

pub fn start_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

/// Store fake with the same uniqueness and atomic-increment guarantees as
/// the `short_links` table.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<Vec<ShortLink>>,
    unavailable: AtomicBool,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn get(&self, short_id: &str) -> Option<ShortLink> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.short_id == short_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    /// Inserts a record directly, bypassing validation.
    pub fn seed(&self, short_id: &str, url: &str, expires_at: Option<DateTime<Utc>>) {
        let mut links = self.links.lock().unwrap();
        let id = links.len() as i64 + 1;
        links.push(ShortLink {
            id,
            short_id: short_id.to_string(),
            original_url: url.to_string(),
            clicks: 0,
            is_active: true,
            expires_at,
            created_at: start_time(),
        });
    }

    fn check(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(AppError::unavailable("Database unavailable", json!({})))
        } else {
            Ok(())
        }
    }
}

fn matches_search(link: &ShortLink, search: &Option<String>) -> bool {
    match search {
        None => true,
        Some(term) => {
            let term = term.to_lowercase();
            link.short_id.to_lowercase().contains(&term)
                || link.original_url.to_lowercase().contains(&term)
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();

        if links.iter().any(|l| l.short_id == new_link.short_id) {
            return Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "short_links_short_id_key" }),
            ));
        }

        let id = links.iter().map(|l| l.id).max().unwrap_or(0) + 1;
        let link = ShortLink {
            id,
            short_id: new_link.short_id,
            original_url: new_link.original_url,
            clicks: 0,
            is_active: true,
            expires_at: new_link.expires_at,
            created_at: start_time() + Duration::seconds(id),
        };
        links.push(link.clone());
        Ok(link)
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        self.check()?;
        Ok(self.get(short_id))
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        match links.iter_mut().find(|l| l.short_id == short_id) {
            Some(link) => {
                link.clicks += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_active(
        &self,
        short_id: &str,
        is_active: bool,
    ) -> Result<Option<ShortLink>, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        Ok(links
            .iter_mut()
            .find(|l| l.short_id == short_id)
            .map(|link| {
                link.is_active = is_active;
                link.clone()
            }))
    }

    async fn delete(&self, short_id: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| l.short_id != short_id);
        Ok(links.len() < before)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        self.check()?;
        let mut links = self.links.lock().unwrap();
        let before = links.len();
        links.retain(|l| !l.is_expired_at(now));
        Ok((before - links.len()) as u64)
    }

    async fn list(&self, filter: LinkFilter) -> Result<Vec<ShortLink>, AppError> {
        self.check()?;
        let links = self.links.lock().unwrap();
        let mut matching: Vec<ShortLink> = links
            .iter()
            .filter(|l| matches_search(l, &filter.search))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count(&self, search: Option<String>) -> Result<i64, AppError> {
        self.check()?;
        let links = self.links.lock().unwrap();
        Ok(links.iter().filter(|l| matches_search(l, &search)).count() as i64)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

/// Cache fake that honours TTLs against the shared manual clock.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (CachedLink, DateTime<Utc>)>>,
    clock: Arc<dyn Clock>,
    failing: AtomicBool,
}

impl MemoryCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
            failing: AtomicBool::new(false),
        }
    }

    /// Makes every call fail as if Redis were down.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns the live entry for `short_id`, if any.
    pub fn peek(&self, short_id: &str) -> Option<CachedLink> {
        let now = self.clock.now();
        self.entries
            .lock()
            .unwrap()
            .get(short_id)
            .filter(|(_, deadline)| now < *deadline)
            .map(|(link, _)| link.clone())
    }

    /// Writes an entry directly, bypassing the services.
    pub fn put(&self, short_id: &str, link: CachedLink, ttl_seconds: i64) {
        let deadline = self.clock.now() + Duration::seconds(ttl_seconds);
        self.entries
            .lock()
            .unwrap()
            .insert(short_id.to_string(), (link, deadline));
    }

    fn check(&self) -> CacheResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(CacheError::ConnectionError("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_link(&self, short_id: &str) -> CacheResult<Option<CachedLink>> {
        self.check()?;
        Ok(self.peek(short_id))
    }

    async fn set_link(
        &self,
        short_id: &str,
        link: &CachedLink,
        ttl_seconds: u64,
    ) -> CacheResult<()> {
        self.check()?;
        self.put(short_id, link.clone(), ttl_seconds as i64);
        Ok(())
    }

    async fn invalidate(&self, short_id: &str) -> CacheResult<()> {
        self.check()?;
        self.entries.lock().unwrap().remove(short_id);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.check().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Services wired to in-memory fakes and a manual clock.
pub struct TestContext {
    pub repo: Arc<InMemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub clock: Arc<ManualClock>,
    pub link_service: Arc<LinkService>,
    pub redirect_service: Arc<RedirectService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_queue_capacity(100)
    }

    pub fn with_queue_capacity(capacity: usize) -> Self {
        let clock = Arc::new(ManualClock::new(start_time()));
        let dyn_clock: Arc<dyn Clock> = clock.clone();
        let repo = Arc::new(InMemoryLinkRepository::new());
        let cache = Arc::new(MemoryCache::new(dyn_clock.clone()));
        let (click_sender, click_rx) = mpsc::channel(capacity);

        let link_service = Arc::new(LinkService::new(
            repo.clone(),
            cache.clone(),
            dyn_clock.clone(),
            CACHE_TTL_SECONDS,
            BASE_URL,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            repo.clone(),
            cache.clone(),
            dyn_clock,
            click_sender.clone(),
            CACHE_TTL_SECONDS,
        ));

        Self {
            repo,
            cache,
            clock,
            link_service,
            redirect_service,
            click_sender,
            click_rx,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            link_service: self.link_service.clone(),
            redirect_service: self.redirect_service.clone(),
            auth_service: Arc::new(AuthService::new(ADMIN_KEY)),
            cache: self.cache.clone(),
            click_sender: self.click_sender.clone(),
        }
    }

    /// Full router without rate limiting (which needs a peer address).
    pub fn server(&self) -> TestServer {
        self.server_with(RouterOptions::default())
    }

    pub fn server_with(&self, options: RouterOptions) -> TestServer {
        TestServer::new(build_router(self.state(), options)).unwrap()
    }

    /// Number of click events queued so far.
    pub fn queued_clicks(&mut self) -> usize {
        let mut n = 0;
        while self.click_rx.try_recv().is_ok() {
            n += 1;
        }
        n
    }
}
