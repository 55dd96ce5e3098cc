//! Handlers for the admin link management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::api::dto::admin::{
    CleanupResponse, LinkListResponse, ListLinksParams, UpdateLinkRequest,
};
use crate::api::dto::link::LinkResponse;
use crate::application::services::link_service::DEFAULT_PER_PAGE;
use crate::domain::entities::ShortLink;
use crate::error::AppError;
use crate::state::AppState;

fn to_response(state: &AppState, link: ShortLink) -> LinkResponse {
    let short_url = state.link_service.short_url(&link.short_id);
    LinkResponse::from_link(link, short_url)
}

/// Lists links, newest first.
///
/// # Endpoint
///
/// `GET /api/admin/urls?page=1&perPage=20&q=demo`
///
/// # Errors
///
/// Returns 400 Bad Request if `page < 1` or `perPage` is outside `1..=100`.
pub async fn list_links_handler(
    State(state): State<AppState>,
    Query(params): Query<ListLinksParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let page = state
        .link_service
        .list_links(
            params.page.unwrap_or(1),
            params.per_page.unwrap_or(DEFAULT_PER_PAGE),
            params.q,
        )
        .await?;

    let items = page
        .items
        .into_iter()
        .map(|link| to_response(&state, link))
        .collect();

    Ok(Json(LinkListResponse {
        items,
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// Returns one link, including inactive and expired ones.
///
/// # Endpoint
///
/// `GET /api/admin/urls/{shortId}`
pub async fn get_link_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.get_link(&short_id).await?;
    Ok(Json(to_response(&state, link)))
}

/// Activates or deactivates a link.
///
/// # Endpoint
///
/// `PATCH /api/admin/urls/{shortId}` with body `{"isActive": false}`
///
/// The cached entry is dropped, so the change is visible on the next
/// resolution.
pub async fn update_link_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state
        .link_service
        .set_active(&short_id, payload.is_active)
        .await?;
    Ok(Json(to_response(&state, link)))
}

/// Permanently deletes a link.
///
/// # Endpoint
///
/// `DELETE /api/admin/urls/{shortId}`
///
/// # Response
///
/// `204 No Content`
pub async fn delete_link_handler(
    State(state): State<AppState>,
    Path(short_id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete_link(&short_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Runs the expiry sweep immediately.
///
/// # Endpoint
///
/// `POST /api/admin/cleanup`
///
/// # Response
///
/// ```json
/// { "deleted": 3 }
/// ```
pub async fn cleanup_handler(
    State(state): State<AppState>,
) -> Result<Json<CleanupResponse>, AppError> {
    let deleted = state.link_service.purge_expired().await?;
    Ok(Json(CleanupResponse { deleted }))
}
