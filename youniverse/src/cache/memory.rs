//! In-memory cache implementation.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
    time::{Duration, Instant},
};

use super::traits::CacheStorage;

/// In-memory cache with per-entry TTL and an optional default TTL.
#[derive(Debug, Default)]
pub struct MemoryCache {
    data: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Option<Duration>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }
}

impl MemoryCache {
    /// Create a new empty cache whose entries never expire unless a TTL is given.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache applying `ttl` to entries stored without one.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            data: RwLock::default(),
            default_ttl: Some(ttl),
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.values().filter(|e| !e.is_expired(now)).count()
    }

    /// Check if there are no live entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove expired entries.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.retain(|_, v| !v.is_expired(now));
    }
}

#[async_trait]
impl CacheStorage for MemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        data.get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.data.clone())
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) {
        let expires_at = ttl.or(self.default_ttl).map(|d| Instant::now() + d);
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.insert(
            key.to_owned(),
            CacheEntry {
                data: value.to_vec(),
                expires_at,
            },
        );
    }

    async fn remove(&self, key: &str) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.remove(key);
    }

    async fn remove_prefix(&self, prefix: &str) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.retain(|k, _| !k.starts_with(prefix));
    }

    async fn clear(&self) {
        let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
        data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_operations() {
        let cache = MemoryCache::new();

        cache.set("profile/u1", b"value1", None).await;
        assert_eq!(cache.get("profile/u1").await, Some(b"value1".to_vec()));
        assert_eq!(cache.len(), 1);

        cache.remove("profile/u1").await;
        assert_eq!(cache.get("profile/u1").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_remove_prefix() {
        let cache = MemoryCache::new();

        cache.set("profile/a", b"1", None).await;
        cache.set("profile/b", b"2", None).await;
        cache.set("other/c", b"3", None).await;

        cache.remove_prefix("profile/").await;
        assert!(cache.get("profile/a").await.is_none());
        assert!(cache.get("profile/b").await.is_none());
        assert_eq!(cache.get("other/c").await, Some(b"3".to_vec()));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let cache = MemoryCache::new();

        cache
            .set("key", b"value", Some(Duration::from_millis(60)))
            .await;
        assert!(cache.get("key").await.is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get("key").await.is_none());
        cache.cleanup();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_default_ttl_applies() {
        let cache = MemoryCache::with_default_ttl(Duration::from_millis(40));

        cache.set("a", b"1", None).await;
        cache.set("b", b"2", Some(Duration::from_secs(60))).await;

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(cache.get("a").await.is_none());
        assert!(cache.get("b").await.is_some());
    }

    #[tokio::test]
    async fn test_clear() {
        let cache = MemoryCache::new();

        cache.set("a", b"1", None).await;
        cache.set("b", b"2", None).await;

        cache.clear().await;

        assert!(cache.is_empty());
    }
}
