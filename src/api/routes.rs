//! API route configuration.

use crate::api::handlers::{
    cleanup_handler, delete_link_handler, get_link_handler, list_links_handler, resolve_handler,
    shorten_handler, update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link creation, mounted under `/api`. Kept separate so that rate limiting
/// applies to it alone.
///
/// - `POST /shorten` - Create a short link
pub fn shorten_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(shorten_handler))
}

/// Public read routes, mounted under `/api`.
///
/// - `GET /resolve/{shortId}` - Resolve a code to its URL without redirecting
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/resolve/{short_id}", get(resolve_handler))
}

/// Admin routes, mounted under `/api/admin` behind admin key authentication.
///
/// # Endpoints
///
/// - `GET    /urls`            - List links (paginated, searchable)
/// - `GET    /urls/{shortId}`  - Link details
/// - `PATCH  /urls/{shortId}`  - Activate or deactivate
/// - `DELETE /urls/{shortId}`  - Delete permanently
/// - `POST   /cleanup`         - Run the expiry sweep now
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/urls", get(list_links_handler))
        .route(
            "/urls/{short_id}",
            get(get_link_handler)
                .patch(update_link_handler)
                .delete(delete_link_handler),
        )
        .route("/cleanup", post(cleanup_handler))
}
