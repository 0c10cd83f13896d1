use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::types::CachedHttpResponse;
use crate::constants::cache_ttl;

/// In-memory LRU cache of response bodies, keyed by derived cache key.
///
/// Clones share the same storage.
#[derive(Debug, Clone)]
pub struct HttpResponseCache {
    entries: Arc<RwLock<LruCache<String, CachedHttpResponse>>>,
    default_ttl: Duration,
}

impl Default for HttpResponseCache {
    fn default() -> Self {
        Self::new(
            cache_ttl::HTTP_RESPONSE_CAPACITY,
            Duration::from_secs(cache_ttl::HTTP_RESPONSE_SECONDS),
        )
    }
}

impl HttpResponseCache {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Arc::new(RwLock::new(LruCache::new(capacity))),
            default_ttl,
        }
    }

    /// Caches a response body under `key` with the default TTL
    pub async fn put(&self, key: &str, data: String) {
        self.put_with_ttl(key, data, self.default_ttl).await;
    }

    #[instrument(skip(self, data), fields(key = %key))]
    pub async fn put_with_ttl(&self, key: &str, data: String, ttl: Duration) {
        debug!(
            "Caching HTTP response: key={}, data_size={}, ttl={:?}",
            key,
            data.len(),
            ttl
        );
        let mut entries = self.entries.write().await;
        entries.put(key.to_string(), CachedHttpResponse::new(data, ttl));
    }

    /// Retrieves a cached body if present and not expired; expired entries are evicted
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.write().await;

        let Some(entry) = entries.get(key) else {
            debug!("Cache miss for HTTP response: key={}", key);
            return None;
        };

        if entry.is_expired() {
            warn!(
                "Removing expired HTTP response cache entry: key={}, age={:?}, ttl={:?}",
                key,
                entry.cached_at.elapsed(),
                entry.ttl
            );
            entries.pop(key);
            return None;
        }

        debug!(
            "Cache hit for HTTP response: key={}, data_size={}, age={:?}",
            key,
            entry.data.len(),
            entry.cached_at.elapsed()
        );
        Some(entry.data.clone())
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.pop(key).is_some()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn capacity(&self) -> usize {
        self.entries.read().await.cap().get()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = HttpResponseCache::default();
        cache.put("season-202504", "{\"subjects\":[]}".to_string()).await;

        assert_eq!(
            cache.get("season-202504").await.as_deref(),
            Some("{\"subjects\":[]}")
        );
        assert_eq!(cache.get("season-202501").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_evicted() {
        let cache = HttpResponseCache::default();
        cache
            .put_with_ttl("available-seasons", "{}".to_string(), Duration::ZERO)
            .await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(cache.get("available-seasons").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_lru_capacity_evicts_oldest() {
        let cache = HttpResponseCache::new(2, Duration::from_secs(60));
        cache.put("a", "1".to_string()).await;
        cache.put("b", "2".to_string()).await;
        cache.put("c", "3".to_string()).await;

        assert_eq!(cache.capacity().await, 2);
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.get("c").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = HttpResponseCache::default();
        let other = cache.clone();
        other.put("k", "v".to_string()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("v"));

        assert!(cache.remove("k").await);
        cache.put("x", "y".to_string()).await;
        other.clear().await;
        assert!(cache.is_empty().await);
    }
}
