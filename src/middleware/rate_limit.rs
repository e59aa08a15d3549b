//! Rate limiting middleware.
//!
//! Fixed-window request counting per client IP, applied to the credential
//! endpoints to slow down password guessing.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Stale windows are swept once the table grows past this many clients.
const SWEEP_THRESHOLD: usize = 10_000;

/// Configuration for rate limiting.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window duration.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 20,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(60),
        }
    }
}

/// Rate limiter state tracking requests per IP.
#[derive(Clone)]
pub struct RateLimitLayer {
    config: RateLimitConfig,
    state: Arc<Mutex<HashMap<IpAddr, RateLimitEntry>>>,
}

struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Exceeded { retry_after: Duration },
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateLimitResult {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> RateLimitResult {
        let mut state = self.state.lock();
        let window = self.config.window;

        if state.len() > SWEEP_THRESHOLD {
            state.retain(|_, entry| now.duration_since(entry.window_start) < window);
        }

        let entry = state.entry(ip).or_insert(RateLimitEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start) >= window {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;

        if entry.count > self.config.max_requests {
            let reset_at = entry.window_start + window;
            RateLimitResult::Exceeded {
                retry_after: reset_at.saturating_duration_since(now),
            }
        } else {
            RateLimitResult::Allowed {
                remaining: self.config.max_requests - entry.count,
            }
        }
    }
}

/// Rate limiting middleware function.
///
/// Requests served without connection info (in-process tests) share one bucket.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimitLayer>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(ip) {
        RateLimitResult::Allowed { remaining } => {
            let mut response = next.run(request).await;
            response
                .headers_mut()
                .insert("X-RateLimit-Remaining", HeaderValue::from(remaining));
            response
        }
        RateLimitResult::Exceeded { retry_after } => {
            // Round up so clients never retry before the window resets
            let retry_secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            warn!(
                ip = %ip,
                path = %request.uri().path(),
                retry_after_secs = retry_secs,
                "⛔ Rate limit exceeded"
            );

            let body = serde_json::json!({
                "success": false,
                "message": "Too many attempts. Please try again later.",
                "retryAfterSeconds": retry_secs,
            });

            (
                StatusCode::TOO_MANY_REQUESTS,
                [("Retry-After", retry_secs.to_string())],
                Json(body),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32) -> RateLimitLayer {
        RateLimitLayer::new(RateLimitConfig {
            max_requests,
            window: Duration::from_secs(60),
        })
    }

    #[test]
    fn test_rate_limit_allows_under_limit() {
        let limiter = limiter(3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        assert_eq!(limiter.check(ip), RateLimitResult::Allowed { remaining: 2 });
        assert_eq!(limiter.check(ip), RateLimitResult::Allowed { remaining: 1 });
        assert_eq!(limiter.check(ip), RateLimitResult::Allowed { remaining: 0 });
        assert!(matches!(limiter.check(ip), RateLimitResult::Exceeded { .. }));
    }

    #[test]
    fn test_clients_are_counted_separately() {
        let limiter = limiter(1);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(matches!(limiter.check(a), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check(b), RateLimitResult::Allowed { .. }));
        assert!(matches!(limiter.check(a), RateLimitResult::Exceeded { .. }));
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(1);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();
        let start = Instant::now();

        assert!(matches!(limiter.check_at(ip, start), RateLimitResult::Allowed { .. }));
        match limiter.check_at(ip, start + Duration::from_secs(20)) {
            RateLimitResult::Exceeded { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(40))
            }
            other => panic!("expected exceeded, got {other:?}"),
        }
        assert!(matches!(
            limiter.check_at(ip, start + Duration::from_secs(61)),
            RateLimitResult::Allowed { .. }
        ));
    }
}
