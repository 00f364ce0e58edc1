/**
 * Rate Limiting Middleware
 *
 * A per-client token bucket: every client starts with `capacity` tokens,
 * each request spends one, and tokens refill continuously at
 * `capacity / window` per second. A client that runs dry gets 429 until a
 * token has refilled.
 *
 * Clients are keyed by peer IP (`ConnectInfo`), falling back to the first
 * `X-Forwarded-For` entry, then to a shared `unknown` bucket.
 */

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Buckets idle longer than this many windows are dropped during pruning
const IDLE_WINDOWS_BEFORE_PRUNE: u32 = 2;
const PRUNE_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    buckets: Mutex<HashMap<String, Bucket>>,
    capacity: f64,
    refill_per_sec: f64,
    window: Duration,
}

impl RateLimiter {
    /// Allow `requests` per `window` for each client
    pub fn new(requests: u32, window: Duration) -> Self {
        let capacity = f64::from(requests.max(1));
        let window_secs = window.as_secs_f64().max(f64::EPSILON);
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity,
            refill_per_sec: capacity / window_secs,
            window,
        }
    }

    /// Spend one token for `key`, returning `false` when none is left
    pub async fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut lock = self.buckets.lock().await;

        if lock.len() > PRUNE_THRESHOLD {
            let idle = self.window * IDLE_WINDOWS_BEFORE_PRUNE;
            lock.retain(|_, bucket| now.duration_since(bucket.last_refill) < idle);
        }

        let bucket = lock.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: self.capacity,
            last_refill: now,
        });
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.last_refill = now;
        bucket.tokens = (bucket.tokens + (elapsed * self.refill_per_sec)).min(self.capacity);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reject requests beyond the configured per-client rate with 429
pub async fn rate_limit_middleware(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let key = client_key(&request);

    if !app_state.rate_limiter.allow(&key).await {
        tracing::warn!(client = %key, "Rate limit exceeded");
        return Err(BackendError::TooManyRequests(
            "Too many requests, please try again later".to_string(),
        ));
    }

    Ok(next.run(request).await)
}
