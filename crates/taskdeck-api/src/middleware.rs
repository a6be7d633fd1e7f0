//! Request-level middleware: request ids, CORS origins, rate limiting.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{Quota, RateLimiter};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::RateLimitConfig;
use crate::AppState;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// CORS
// =============================================================================

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Parse a comma-separated origin allow-list.
///
/// Falls back to `http://localhost:3000` when unset or blank; invalid
/// entries are logged and dropped.
///
/// ```text
/// ALLOWED_ORIGINS=https://tasks.example.com,http://localhost:3000
/// ```
pub fn parse_allowed_origins(raw: Option<&str>) -> Vec<HeaderValue> {
    let origins_str = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return vec![HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN)],
    };

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// RATE LIMITING
// =============================================================================

pub type GlobalRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Build the global limiter, or None when disabled.
pub fn build_rate_limiter(config: &RateLimitConfig) -> Option<Arc<GlobalRateLimiter>> {
    if !config.enabled {
        return None;
    }

    let burst = NonZeroU32::new(u32::try_from(config.requests).unwrap_or(u32::MAX))
        .unwrap_or(NonZeroU32::MIN);
    let period = Duration::from_secs(config.period_secs.max(1));
    let quota = Quota::with_period(period / burst.get())
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst);

    Some(Arc::new(RateLimiter::direct(quota)))
}

pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Too many requests. Please wait before retrying."
                })),
            )
                .into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_origin() {
        assert_eq!(
            parse_allowed_origins(None),
            vec![HeaderValue::from_static("http://localhost:3000")]
        );
        assert_eq!(parse_allowed_origins(Some("  ")).len(), 1);
    }

    #[test]
    fn test_origin_list() {
        let origins = parse_allowed_origins(Some(
            "https://tasks.example.com, ,http://localhost:5173",
        ));
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://tasks.example.com");
    }

    #[test]
    fn test_invalid_origin_dropped() {
        let origins = parse_allowed_origins(Some("https://ok.example.com,bad\norigin"));
        assert_eq!(origins.len(), 1);
    }

    #[test]
    fn test_rate_limiter_disabled() {
        let config = RateLimitConfig {
            enabled: false,
            requests: 10,
            period_secs: 60,
        };
        assert!(build_rate_limiter(&config).is_none());
    }

    #[test]
    fn test_rate_limiter_allows_burst_then_blocks() {
        let config = RateLimitConfig {
            enabled: true,
            requests: 3,
            period_secs: 60,
        };
        let limiter = build_rate_limiter(&config).unwrap();
        for _ in 0..3 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_request_id_is_uuid() {
        let mut maker = MakeRequestUuidV7;
        let request = axum::http::Request::new(());
        let id = maker.make_request_id(&request).unwrap();
        let raw = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(raw).is_ok());
    }
}
