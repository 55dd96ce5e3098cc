//! Handler for the link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::link::LinkResponse;
use crate::api::dto::shorten::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "originalUrl": "https://example.com/a",
///   "customAlias": "demo",   // optional
///   "expireDays": 7          // optional, 0 or absent = permanent
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "id": 1,
///   "shortId": "demo",
///   "shortUrl": "http://localhost:3000/demo",
///   "originalUrl": "https://example.com/a",
///   "clicks": 0,
///   "isActive": true,
///   "expiresAt": "2025-01-08T00:00:00Z",
///   "createdAt": "2025-01-01T00:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the URL, alias or expiry is invalid
/// - 409 Conflict if the alias is already taken
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .create_short_link(
            payload.original_url,
            payload.custom_alias,
            payload.expire_days,
        )
        .await?;

    let short_url = state.link_service.short_url(&link.short_id);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, short_url)),
    ))
}
