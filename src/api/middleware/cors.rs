//! CORS policy for the browser frontend.

use axum::http::{HeaderName, HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::CorsLayer;

use super::auth::ADMIN_KEY_HEADER;

/// Builds a CORS layer allowing `origin` to call the API with credentials.
///
/// Returns `None` if `origin` is not a valid header value.
pub fn layer(origin: &str) -> Option<CorsLayer> {
    let origin = HeaderValue::from_str(origin).ok()?;

    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(ADMIN_KEY_HEADER),
            ])
            .allow_credentials(true)
            .max_age(Duration::from_secs(3600)),
    )
}
