// src/cache.rs
//! Digest cache: whole serialized digests under a version key, absolute TTL.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::Instant;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache lock poisoned")]
    Poisoned,
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store for serialized digests. Expiry is owned by the store.
#[async_trait]
pub trait DigestCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

/// Longest expiry a store will honor. Larger TTLs are clamped to this.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// `news:{version}`
pub fn digest_key(version: &str) -> String {
    format!("news:{version}")
}

/// Always misses, drops writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

#[async_trait]
impl DigestCache for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-process store. Expired entries read as misses and are evicted on access.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict(&self, key: &str) -> Result<(), CacheError> {
        let mut w = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        if w.get(key).is_some_and(|e| e.expires_at <= Instant::now()) {
            w.remove(key);
        }
        Ok(())
    }
}

#[async_trait]
impl DigestCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        {
            let r = self.entries.read().map_err(|_| CacheError::Poisoned)?;
            match r.get(key) {
                None => return Ok(None),
                Some(e) if e.expires_at > Instant::now() => return Ok(Some(e.value.clone())),
                Some(_) => {}
            }
        }
        // Expired; evict lazily.
        self.evict(key)?;
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now() + ttl.min(MAX_TTL);
        let mut w = self.entries.write().map_err(|_| CacheError::Poisoned)?;
        w.insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn memory_cache_hit_until_ttl_then_evicts() {
        let cache = MemoryCache::new();
        cache
            .put("news:v1", "{}".into(), Duration::from_secs(300))
            .await
            .unwrap();
        assert_eq!(cache.get("news:v1").await.unwrap().as_deref(), Some("{}"));

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get("news:v1").await.unwrap().is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("news:v1").await.unwrap(), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn keys_are_isolated_per_version() {
        let cache = MemoryCache::new();
        cache
            .put(&digest_key("a"), "A".into(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(&digest_key("b")).await.unwrap(), None);
        assert_eq!(cache.get("news:a").await.unwrap().as_deref(), Some("A"));
    }

    #[tokio::test]
    async fn last_writer_wins() {
        let cache = MemoryCache::new();
        let ttl = Duration::from_secs(60);
        cache.put("k", "one".into(), ttl).await.unwrap();
        cache.put("k", "two".into(), ttl).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn huge_ttl_is_clamped_not_overflowed() {
        let cache = MemoryCache::new();
        cache
            .put("k", "v".into(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        cache.put("m", "w".into(), Duration::MAX).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(cache.get("m").await.unwrap().as_deref(), Some("w"));
    }

    #[tokio::test(start_paused = true)]
    async fn clamped_entry_expires_after_max_ttl() {
        let cache = MemoryCache::new();
        cache.put("k", "v".into(), Duration::MAX).await.unwrap();
        tokio::time::advance(MAX_TTL - Duration::from_secs(1)).await;
        assert!(cache.get("k").await.unwrap().is_some());
        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn noop_cache_never_hits() {
        let cache = NoopCache;
        cache.put("k", "v".into(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }
}
