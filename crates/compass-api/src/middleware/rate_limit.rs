//! Per-route-group rate limits, keyed by client IP.
//!
//! Keys come from `SmartIpKeyExtractor`, so the server must be run with
//! `into_make_service_with_connect_info::<SocketAddr>()` (or sit behind a proxy
//! setting `X-Forwarded-For`).

/// Authentication endpoints: 5 requests per second, burst of 10
pub const AUTH_REPLENISH_MS: u64 = 200;
pub const AUTH_BURST_SIZE: u32 = 10;

/// Everything else: 10 requests per second, burst of 20
pub const GENERAL_REPLENISH_MS: u64 = 100;
pub const GENERAL_BURST_SIZE: u32 = 20;

/// Build a `GovernorLayer` that replenishes one request every `$replenish_ms`
/// milliseconds and allows bursts of `$burst`.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($replenish_ms:expr, $burst:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_millisecond($replenish_ms)
            .burst_size($burst)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .finish()
            .expect("rate limit period and burst are non-zero");
        ::tower_governor::GovernorLayer::new(config)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn request() -> Request<Body> {
        Request::builder()
            .uri("/limited")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_burst_then_throttled() {
        let app = Router::new()
            .route("/limited", get(|| async { "ok" }))
            .layer(make_rate_limit_layer!(AUTH_REPLENISH_MS, AUTH_BURST_SIZE));

        let mut statuses = Vec::new();
        for _ in 0..(AUTH_BURST_SIZE + 5) {
            let response = app.clone().oneshot(request()).await.unwrap();
            statuses.push(response.status());
        }

        assert!(statuses[..AUTH_BURST_SIZE as usize]
            .iter()
            .all(|status| *status == StatusCode::OK));
        assert!(
            statuses.contains(&StatusCode::TOO_MANY_REQUESTS),
            "expected throttling after the burst, got {statuses:?}"
        );
    }
}
