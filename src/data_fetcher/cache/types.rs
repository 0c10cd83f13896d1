//! Cache entry types with TTL support

use std::time::{Duration, Instant};

/// Cached HTTP response body with TTL support
#[derive(Debug, Clone)]
pub struct CachedHttpResponse {
    pub data: String,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedHttpResponse {
    /// Creates a new cached HTTP response entry
    pub fn new(data: String, ttl: Duration) -> Self {
        Self {
            data,
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Checks if the cached data is expired
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }

    /// Gets the remaining time until expiration
    pub fn time_until_expiry(&self) -> Duration {
        self.ttl.saturating_sub(self.cached_at.elapsed())
    }
}
