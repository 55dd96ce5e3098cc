//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`              - Health check: DB, cache, click queue (public)
//! - `POST /api/shorten`         - Create a short link (public, rate limited)
//! - `GET  /api/resolve/{id}`    - Resolve without redirect (public)
//! - `/api/admin/*`              - Link administration (admin key required)
//! - `GET  /{shortId}`           - Short link redirect (public)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Frontend origin, when configured
//! - **Rate limiting** - Per-IP token bucket on link creation
//! - **Authentication** - Admin API key on `/api/admin`
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{auth, cors, rate_limit, tracing};
use crate::config::Config;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// HTTP options that shape the middleware stack.
#[derive(Debug, Clone, Default)]
pub struct RouterOptions {
    /// Read client IP from forwarding headers for rate limiting.
    pub behind_proxy: bool,
    /// `None` disables rate limiting.
    pub rate_limit_per_minute: Option<u32>,
    /// `None` disables the CORS layer.
    pub cors_origin: Option<String>,
}

impl RouterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            behind_proxy: config.behind_proxy,
            rate_limit_per_minute: (!config.disable_rate_limit)
                .then_some(config.rate_limit_per_minute),
            cors_origin: config.origin_frontend.clone(),
        }
    }
}

/// Constructs the application router with all routes and middleware.
///
/// Rate limiting needs the peer address, so the router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()` when it is enabled.
pub fn app_router(state: AppState, options: RouterOptions) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, options))
}

/// The router without trailing-slash normalization.
pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let shorten = match options.rate_limit_per_minute {
        Some(limit) if options.behind_proxy => {
            api::routes::shorten_routes().layer(rate_limit::proxy_layer(limit))
        }
        Some(limit) => api::routes::shorten_routes().layer(rate_limit::layer(limit)),
        None => api::routes::shorten_routes(),
    };

    let admin = api::routes::admin_routes()
        .route_layer(middleware::from_fn_with_state(state.clone(), auth::layer));

    let api_router = Router::new()
        .merge(shorten)
        .merge(api::routes::public_routes())
        .nest("/admin", admin);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_router)
        .route("/{short_id}", get(redirect_handler))
        .with_state(state);

    if let Some(origin) = options.cors_origin.as_deref() {
        match cors::layer(origin) {
            Some(layer) => router = router.layer(layer),
            None => ::tracing::warn!(origin, "Ignoring invalid CORS origin"),
        }
    }

    router.layer(tracing::layer())
}
