//! Admin API key authentication middleware.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;

use crate::{error::AppError, state::AppState};

/// Header carrying the admin key, as sent by the admin console.
pub const ADMIN_KEY_HEADER: &str = "x-admin-api-key";

/// Authenticates admin requests.
///
/// # Header Format
///
/// Either of:
///
/// ```text
/// x-admin-api-key: <key>
/// Authorization: Bearer <key>
/// ```
///
/// `x-admin-api-key` is checked first.
///
/// # Errors
///
/// Returns `401 Unauthorized` if no key is presented or the key does not
/// match `ADMIN_API_KEY`. The response carries `WWW-Authenticate: Bearer`.
///
/// # Example
///
/// ```rust,ignore
/// use axum::{Router, routing::get, middleware};
/// use crate::api::middleware::auth;
///
/// let admin = Router::new()
///     .route("/urls", get(list_links_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let key = match header_key(&parts.headers) {
        Some(key) => key,
        None => {
            let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
                .await
                .map_err(|_| {
                    AppError::unauthorized(
                        "Unauthorized",
                        serde_json::json!({"reason": "Admin API key is missing"}),
                    )
                })?;
            token
        }
    };

    st.auth_service.authenticate(&key)?;

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

fn header_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
