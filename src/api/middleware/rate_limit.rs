//! Rate limiting middleware using token bucket algorithm.

use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

/// Milliseconds between token refills for `per_minute` requests per minute.
fn refill_interval_ms(per_minute: u32) -> u64 {
    (60_000 / u64::from(per_minute.max(1))).max(1)
}

fn config<K: KeyExtractor>(
    key_extractor: K,
    per_minute: u32,
) -> Arc<GovernorConfig<K, NoOpMiddleware<QuantaInstant>>> {
    Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(key_extractor)
            .per_millisecond(refill_interval_ms(per_minute))
            .burst_size(per_minute.max(1))
            .finish()
            .expect("refill interval and burst size are non-zero"),
    )
}

/// Creates a per-IP rate limiter for link creation keyed on the socket peer address.
///
/// # Limits
///
/// - **Burst**: `per_minute` requests
/// - **Refill**: one request every `60 / per_minute` seconds
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/shorten", post(shorten_handler))
///     .layer(rate_limit::layer(5));
/// ```
pub fn layer(
    per_minute: u32,
) -> GovernorLayer<PeerIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    GovernorLayer::new(config(PeerIpKeyExtractor, per_minute))
}

/// Same limits as [`layer`], keyed on `X-Forwarded-For` / `X-Real-IP` / `Forwarded`
/// with a fallback to the peer address.
///
/// Use only behind a trusted reverse proxy; otherwise clients can forge the header.
pub fn proxy_layer(
    per_minute: u32,
) -> GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body> {
    GovernorLayer::new(config(SmartIpKeyExtractor, per_minute))
}
