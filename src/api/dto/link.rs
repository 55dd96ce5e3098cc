//! JSON representation of a short link.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::ShortLink;

/// A link as returned by the shorten and admin endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub short_id: String,
    pub short_url: String,
    pub original_url: String,
    pub clicks: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: ShortLink, short_url: String) -> Self {
        Self {
            id: link.id,
            short_id: link.short_id,
            short_url,
            original_url: link.original_url,
            clicks: link.clicks,
            is_active: link.is_active,
            expires_at: link.expires_at,
            created_at: link.created_at,
        }
    }
}
