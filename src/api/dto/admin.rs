//! DTOs for the admin endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::link::LinkResponse;

/// Query parameters for `GET /api/admin/urls`.
///
/// Uses `serde_with` to parse page numbers from query strings as integers.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLinksParams {
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub page: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub per_page: Option<i64>,

    /// Case-insensitive search over short id and original URL.
    #[serde(default)]
    pub q: Option<String>,
}

/// One page of links.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Request body for `PATCH /api/admin/urls/{shortId}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkRequest {
    pub is_active: bool,
}

/// Result of a manual expiry sweep.
#[derive(Debug, Serialize)]
pub struct CleanupResponse {
    pub deleted: u64,
}
