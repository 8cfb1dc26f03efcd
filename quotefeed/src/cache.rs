use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

#[derive(Debug)]
struct Entry {
    body: String,
    expires_at: Instant,
}

#[derive(Debug)]
struct Inner {
    entries: HashMap<String, Entry>,
    ttl: Duration,
}

/// TTL'd in-memory cache for response bodies, keyed by request URL.
///
/// A zero TTL disables the cache entirely: lookups miss and stores are
/// dropped.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<RwLock<Inner>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                ttl,
            })),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Returns the cached body for `url` if present and not expired.
    pub async fn get(&self, url: &str) -> Option<String> {
        let inner = self.inner.read().await;
        inner.entries.get(url).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.body.clone())
            } else {
                None
            }
        })
    }

    /// Stores `body` under `url` for the configured TTL.
    pub async fn put(&self, url: &str, body: String) {
        let mut inner = self.inner.write().await;
        if inner.ttl == Duration::ZERO {
            return;
        }
        let expires_at = Instant::now() + inner.ttl;
        inner.entries.insert(url.to_string(), Entry { body, expires_at });
    }

    /// Drops every entry whose TTL has elapsed.
    pub async fn purge_expired(&self) {
        let mut inner = self.inner.write().await;
        let now = Instant::now();
        inner.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hit_before_ttl_miss_after() {
        let cache = ResponseCache::new(Duration::from_millis(100));

        assert!(cache.get("https://example.test/a").await.is_none());
        cache.put("https://example.test/a", "body".into()).await;
        assert_eq!(cache.get("https://example.test/a").await.as_deref(), Some("body"));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(cache.get("https://example.test/a").await.is_none());
    }

    #[tokio::test]
    async fn later_put_overwrites() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        cache.put("k", "first".into()).await;
        cache.put("k", "second".into()).await;
        assert_eq!(cache.get("k").await.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn purge_drops_only_expired_entries() {
        let cache = ResponseCache::new(Duration::from_millis(100));
        cache.put("old", "x".into()).await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        cache.put("fresh", "y".into()).await;

        cache.purge_expired().await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("fresh").await.as_deref(), Some("y"));
    }

    #[tokio::test]
    async fn disabled_cache_stores_nothing() {
        let cache = ResponseCache::disabled();
        cache.put("k", "v".into()).await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.is_empty().await);
    }
}
