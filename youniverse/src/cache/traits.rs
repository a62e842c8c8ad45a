//! Cache storage trait definitions.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::{Error, Result};

/// Trait for cache storage backends.
#[async_trait]
pub trait CacheStorage: Send + Sync + std::fmt::Debug {
    /// Get a value by key.
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Set a value with optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>);

    /// Remove a value by key.
    async fn remove(&self, key: &str);

    /// Remove every key starting with `prefix`.
    async fn remove_prefix(&self, prefix: &str);

    /// Clear all cached values.
    async fn clear(&self);
}

/// Extension trait for cache storage with typed operations.
#[async_trait]
pub trait CacheStorageExt: CacheStorage {
    /// Get a JSON-deserialized value. Undecodable entries count as misses.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(&self, key: &str) -> Option<T> {
        let data = self.get(key).await?;
        match serde_json::from_slice(&data) {
            Ok(value) => Some(value),
            Err(e) => {
                log::debug!("discarding undecodable cache entry {key}: {e}");
                None
            }
        }
    }

    /// Set a JSON-serialized value.
    async fn set_json<T: serde::Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let data = serde_json::to_vec(value).map_err(|e| Error::Cache(e.to_string()))?;
        self.set(key, &data, ttl).await;
        Ok(())
    }
}

impl<T: CacheStorage + ?Sized> CacheStorageExt for T {}

/// Cache key of a profile.
pub(crate) fn profile_key(user_id: &crate::models::UserId) -> String {
    format!("profile/{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::{Profile, UserId};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_json_roundtrip_through_trait_object() {
        let cache: Arc<dyn CacheStorage> = Arc::new(MemoryCache::new());
        let profile = Profile {
            id: "u1".into(),
            name: "Kavya".into(),
            ..Default::default()
        };
        let key = profile_key(&UserId::new("u1"));

        cache.set_json(&key, &profile, None).await.unwrap();
        let cached: Option<Profile> = cache.get_json(&key).await;
        assert_eq!(cached, Some(profile));
    }

    #[tokio::test]
    async fn test_undecodable_entry_is_miss() {
        let cache = MemoryCache::new();
        cache.set("profile/u1", b"not json", None).await;
        let cached: Option<Profile> = cache.get_json("profile/u1").await;
        assert!(cached.is_none());
    }
}
