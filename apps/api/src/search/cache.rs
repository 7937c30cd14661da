use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::search::SearchError;

/// Key-value cache with per-entry TTL, used for vocabulary snapshots.
#[async_trait]
pub trait SnapshotCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SearchError>;
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), SearchError>;
    async fn delete(&self, key: &str) -> Result<(), SearchError>;
}

/// Redis-backed cache. Expiry is delegated to Redis (`SETEX`).
///
/// Holds one multiplexed connection for the life of the process. The manager
/// reconnects by itself after a dropped connection, and clones share it.
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Opens the shared connection. Fails when Redis is unreachable at startup.
    pub async fn connect(client: redis::Client) -> Result<Self, SearchError> {
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| SearchError::Cache(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl SnapshotCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, SearchError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| SearchError::Cache(e.to_string()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), SearchError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
            .await
            .map_err(|e| SearchError::Cache(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), SearchError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| SearchError::Cache(e.to_string()))
    }
}

/// In-process fallback when no Redis URL is configured.
#[derive(Default)]
pub struct MemoryCache {
    /// Value and deadline. `None` never expires.
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, SearchError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| SearchError::Cache("memory cache lock poisoned".to_string()))?;
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| expires_at.map_or(true, |at| Instant::now() < at))
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), SearchError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SearchError::Cache("memory cache lock poisoned".to_string()))?;
        // A TTL past what `Instant` can represent means no expiry.
        entries.insert(key.to_string(), (value, Instant::now().checked_add(ttl)));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), SearchError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| SearchError::Cache("memory cache lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_cache_round_trip_and_delete() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache
            .set("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache_expires() {
        let cache = MemoryCache::new();
        cache.set("k", "v".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_cache_huge_ttl_never_expires() {
        let cache = MemoryCache::new();
        cache
            .set("k", "v".to_string(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_redis_connect_failure_is_a_cache_error() {
        // Nothing listens on port 1.
        let client = redis::Client::open("redis://127.0.0.1:1/").unwrap();
        let result = RedisCache::connect(client).await;
        assert!(matches!(result, Err(SearchError::Cache(_))));
    }
}
