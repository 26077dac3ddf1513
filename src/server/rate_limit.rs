//! Per-client request rate limiting.
//!
//! A token bucket per IP: `rate` tokens per second accrue up to
//! `burst`, each request spends one. Clients that run dry get a 429
//! with a machine-readable error body. The visitor table is wiped on a
//! coarse timer so one-off clients do not accumulate forever.

use std::collections::HashMap;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use axum::extract::ConnectInfo;
use axum::extract::Request;
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::debug;

/// Requests per second granted to each client.
pub const REQUESTS_PER_SECOND: f64 = 100.0;

/// Burst capacity per client.
pub const BURST: f64 = 200.0;

/// How often the visitor table is reset.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Shared limiter state, one bucket per client IP.
pub struct RateLimiter {
    visitors: Mutex<HashMap<IpAddr, TokenBucket>>,
    rate: f64,
    burst: f64,
}

#[derive(Serialize)]
struct RateLimitBody {
    error: &'static str,
    message: &'static str,
}

impl RateLimiter {
    pub fn new(rate: f64, burst: f64) -> RateLimiter {
        return RateLimiter {
            visitors: Mutex::new(HashMap::new()),
            rate,
            burst,
        };
    }

    /// Spend one token for `ip`, refilling first. Returns false when
    /// the bucket is empty.
    pub fn allow(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut visitors = self.visitors.lock().unwrap();
        let bucket = visitors.entry(ip).or_insert(TokenBucket {
            tokens: self.burst,
            last_refill: now,
        });

        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            return true;
        }
        return false;
    }

    /// Drop all per-client state.
    pub fn reset(&self) {
        self.visitors.lock().unwrap().clear();
    }
}

/// Periodically wipe the limiter's visitor table in a background task.
pub fn spawn_cleanup(limiter: Arc<RateLimiter>, every: Duration) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(every);
        tick.tick().await; // the first tick fires immediately
        loop {
            tick.tick().await;
            limiter.reset();
            debug!("rate limiter visitor table reset");
        }
    });
}

impl Default for RateLimiter {
    fn default() -> RateLimiter {
        return RateLimiter::new(REQUESTS_PER_SECOND, BURST);
    }
}

/// Axum middleware enforcing the limit per connecting IP.
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if !limiter.allow(addr.ip()) {
        let body = RateLimitBody {
            error: "rate_limit_exceeded",
            message: "Too many requests. Please slow down.",
        };
        return (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    }
    return next.run(request).await;
}
