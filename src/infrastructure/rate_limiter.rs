//! Rate limiter implementation
//!
//! Fixed-window request limiting per client address.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::Mutex;

/// Default number of requests a client may make per window
pub const DEFAULT_MAX_REQUESTS: u32 = 1000;

/// Default window length: 15 minutes
pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

/// Rate limiting configuration for the `/api` routes
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Requests allowed per client within one window
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: DEFAULT_MAX_REQUESTS,
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

/// Result of a rate limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Time until the window resets (in seconds)
    pub reset_in_seconds: u64,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Debug)]
struct Windows {
    by_client: HashMap<String, Window>,
    last_cleanup: Instant,
}

/// Per-client fixed-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(Windows {
                by_client: HashMap::new(),
                last_cleanup: Instant::now(),
            }),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Count a request from `client` and report whether it is allowed.
    ///
    /// Rejected requests are not counted.
    pub async fn check_and_record(&self, client: &str) -> RateLimitResult {
        self.check_and_record_at(client, Instant::now()).await
    }

    async fn check_and_record_at(&self, client: &str, now: Instant) -> RateLimitResult {
        let mut windows = self.windows.lock().await;

        if now.duration_since(windows.last_cleanup) >= self.window {
            let window = self.window;
            windows
                .by_client
                .retain(|_, w| now.duration_since(w.started) < window);
            windows.last_cleanup = now;
        }

        let entry = windows
            .by_client
            .entry(client.to_string())
            .or_insert(Window {
                started: now,
                count: 0,
            });

        if now.duration_since(entry.started) >= self.window {
            *entry = Window {
                started: now,
                count: 0,
            };
        }

        let reset_in_seconds = self
            .window
            .saturating_sub(now.duration_since(entry.started))
            .as_secs();

        if entry.count >= self.limit {
            return RateLimitResult {
                allowed: false,
                remaining: 0,
                limit: self.limit,
                reset_in_seconds,
            };
        }

        entry.count += 1;

        RateLimitResult {
            allowed: true,
            remaining: self.limit - entry.count,
            limit: self.limit,
            reset_in_seconds,
        }
    }

    /// Forget the window of `client`
    pub async fn reset(&self, client: &str) {
        self.windows.lock().await.by_client.remove(client);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.max_requests, 1000);
        assert_eq!(config.window_secs, 900);
    }

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));

        let first = limiter.check_and_record("10.0.0.1").await;
        assert!(first.allowed);
        assert_eq!(first.remaining, 1);
        assert_eq!(first.limit, 2);

        assert!(limiter.check_and_record("10.0.0.1").await.allowed);

        let third = limiter.check_and_record("10.0.0.1").await;
        assert!(!third.allowed);
        assert_eq!(third.remaining, 0);
        assert!(third.reset_in_seconds <= 60);
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check_and_record("10.0.0.1").await.allowed);
        assert!(!limiter.check_and_record("10.0.0.1").await.allowed);
        assert!(limiter.check_and_record("10.0.0.2").await.allowed);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_count() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_and_record_at("a", start).await.allowed);
        assert!(!limiter.check_and_record_at("a", start + Duration::from_secs(59)).await.allowed);

        let renewed = limiter.check_and_record_at("a", start + Duration::from_secs(60)).await;
        assert!(renewed.allowed);
        assert_eq!(renewed.reset_in_seconds, 60);
    }

    #[tokio::test]
    async fn test_cleanup_drops_expired_clients() {
        let limiter = RateLimiter::new(5, Duration::from_secs(10));
        let start = Instant::now();

        limiter.check_and_record_at("old", start).await;
        limiter.check_and_record_at("new", start + Duration::from_secs(30)).await;

        let windows = limiter.windows.lock().await;
        assert!(!windows.by_client.contains_key("old"));
        assert!(windows.by_client.contains_key("new"));
    }

    #[tokio::test]
    async fn test_reset() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        limiter.check_and_record("a").await;
        assert!(!limiter.check_and_record("a").await.allowed);

        limiter.reset("a").await;
        assert!(limiter.check_and_record("a").await.allowed);
    }
}
