//! Handlers for short code resolution.

use axum::{
    Json,
    extract::{Path, State},
    response::Redirect,
};

use crate::api::dto::resolve::ResolveResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{shortId}`
///
/// Resolution goes through [`crate::application::services::RedirectService`]:
/// cache first, store on a miss, then a click is queued for the background
/// worker. The response never waits for the click to be recorded.
///
/// # Errors
///
/// Returns 404 Not Found if the code is unknown, inactive or expired.
pub async fn redirect_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let original_url = state.redirect_service.resolve(&short_id).await?;
    Ok(Redirect::temporary(&original_url))
}

/// Resolves a short code without redirecting.
///
/// # Endpoint
///
/// `GET /api/resolve/{shortId}`
///
/// Counts a click exactly like [`redirect_handler`].
///
/// # Response
///
/// ```json
/// { "originalUrl": "https://example.com/a" }
/// ```
pub async fn resolve_handler(
    Path(short_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ResolveResponse>, AppError> {
    let original_url = state.redirect_service.resolve(&short_id).await?;
    Ok(Json(ResolveResponse { original_url }))
}
