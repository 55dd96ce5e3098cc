//! Repository trait for short link persistence.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Filter and window for listing links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFilter {
    /// Case-insensitive substring matched against short id and original URL.
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl LinkFilter {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            search: None,
            offset,
            limit,
        }
    }

    pub fn with_search(mut self, search: Option<String>) -> Self {
        self.search = search.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Repository interface for short links.
///
/// The store is the source of truth for `is_active`, `expires_at` and
/// `clicks`, and it alone enforces uniqueness of `short_id`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link with `clicks = 0` and `is_active = true`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if `short_id` is already taken. This is
    /// the authoritative uniqueness signal; any earlier existence check is
    /// only an optimization.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link by short id regardless of its active/expiry state.
    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError>;

    /// Atomically adds one click.
    ///
    /// Returns `Ok(false)` if the link no longer exists.
    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError>;

    /// Sets the active flag, returning the updated link or `None` if absent.
    async fn set_active(
        &self,
        short_id: &str,
        is_active: bool,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Physically removes a link. Returns `Ok(false)` if it did not exist.
    async fn delete(&self, short_id: &str) -> Result<bool, AppError>;

    /// Removes every link whose `expires_at <= now`, returning how many rows went.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;

    /// Lists links newest first.
    async fn list(&self, filter: LinkFilter) -> Result<Vec<ShortLink>, AppError>;

    /// Counts links matching the same search as [`Self::list`].
    async fn count(&self, search: Option<String>) -> Result<i64, AppError>;

    /// Round-trips to the store.
    async fn ping(&self) -> Result<(), AppError>;
}
