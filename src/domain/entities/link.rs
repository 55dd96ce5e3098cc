//! Short link entity and its cached projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted short link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub short_id: String,
    pub original_url: String,
    pub clicks: i64,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Returns true once `expires_at` has been reached.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        is_expired(self.expires_at, now)
    }

    /// Returns true if the link may be served at `now`.
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired_at(now)
    }

    /// Projection stored in the cache.
    pub fn to_cached(&self) -> CachedLink {
        CachedLink {
            original_url: self.original_url.clone(),
            is_active: self.is_active,
            expires_at: self.expires_at,
        }
    }
}

/// Input data for inserting a new link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub short_id: String,
    pub original_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Cache value for a short code.
///
/// Carries the validity fields alongside the URL so that every cache hit can
/// be re-checked against the current time and active flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedLink {
    pub original_url: String,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedLink {
    pub fn is_resolvable_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !is_expired(self.expires_at, now)
    }

    /// TTL for this entry: `max_ttl_seconds`, capped at the time left before expiry.
    ///
    /// Returns `None` when the entry should not be cached at all.
    pub fn ttl_seconds(&self, now: DateTime<Utc>, max_ttl_seconds: u64) -> Option<u64> {
        if !self.is_resolvable_at(now) || max_ttl_seconds == 0 {
            return None;
        }

        match self.expires_at {
            None => Some(max_ttl_seconds),
            Some(expires_at) => {
                let remaining = (expires_at - now).num_seconds();
                if remaining <= 0 {
                    None
                } else {
                    Some(max_ttl_seconds.min(remaining as u64))
                }
            }
        }
    }
}

/// One page of links for the admin listing.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<ShortLink>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|e| now >= e)
}
