//! PostgreSQL implementation of the link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{LinkFilter, LinkRepository};
use crate::error::AppError;

const LINK_COLUMNS: &str = "id, short_id, original_url, clicks, is_active, expires_at, created_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_id: String,
    original_url: String,
    clicks: i64,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for ShortLink {
    fn from(r: LinkRow) -> Self {
        ShortLink {
            id: r.id,
            short_id: r.short_id,
            original_url: r.original_url,
            clicks: r.clicks,
            is_active: r.is_active,
            expires_at: r.expires_at,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository backed by the `short_links` table.
///
/// Uniqueness of `short_id` is enforced by the table's unique constraint; a
/// violating insert surfaces as [`AppError::Conflict`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

/// Builds an `ILIKE` pattern matching `term` literally anywhere in the column.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            "INSERT INTO short_links (short_id, original_url, expires_at) \
             VALUES ($1, $2, $3) RETURNING {LINK_COLUMNS}"
        );

        let row: LinkRow = sqlx::query_as(&sql)
            .bind(&new_link.short_id)
            .bind(&new_link.original_url)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_short_id(&self, short_id: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM short_links WHERE short_id = $1");

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(short_id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn increment_clicks(&self, short_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE short_links SET clicks = clicks + 1 WHERE short_id = $1")
            .bind(short_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_active(
        &self,
        short_id: &str,
        is_active: bool,
    ) -> Result<Option<ShortLink>, AppError> {
        let sql = format!(
            "UPDATE short_links SET is_active = $2 WHERE short_id = $1 RETURNING {LINK_COLUMNS}"
        );

        let row: Option<LinkRow> = sqlx::query_as(&sql)
            .bind(short_id)
            .bind(is_active)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, short_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE short_id = $1")
            .bind(short_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM short_links WHERE expires_at IS NOT NULL AND expires_at <= $1",
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn list(&self, filter: LinkFilter) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM short_links \
             WHERE ($1::text IS NULL OR short_id ILIKE $1 OR original_url ILIKE $1) \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );

        let pattern = filter.search.as_deref().map(like_pattern);

        let rows: Vec<LinkRow> = sqlx::query_as(&sql)
            .bind(pattern)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self, search: Option<String>) -> Result<i64, AppError> {
        let pattern = search.as_deref().map(like_pattern);

        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM short_links \
             WHERE ($1::text IS NULL OR short_id ILIKE $1 OR original_url ILIKE $1)",
        )
        .bind(pattern)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
