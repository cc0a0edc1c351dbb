use crate::models::Location;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur with cache operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache miss: {0}")]
    CacheMiss(String),
}

/// Multi-tier cache manager
///
/// L1 is an in-process `moka` cache, L2 an optional Redis instance shared
/// across service replicas. Both tiers expire entries after the same TTL.
/// The Redis connection manager is cloned per call, so no lock is held while
/// a round trip is in flight.
pub struct CacheManager {
    redis: Option<ConnectionManager>,
    l1_cache: moka::future::Cache<String, Vec<u8>>,
    ttl_secs: u64,
}

impl CacheManager {
    /// Create a cache manager backed by Redis as its second tier
    pub async fn new(redis_url: &str, l1_size: u64, ttl_secs: u64) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Some(redis),
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        })
    }

    /// Create an L1-only cache manager
    pub fn in_memory(l1_size: u64, ttl_secs: u64) -> Self {
        Self {
            redis: None,
            l1_cache: build_l1(l1_size, ttl_secs),
            ttl_secs,
        }
    }

    /// Get a value from cache (L1 first, then L2)
    pub async fn get<T>(&self, key: &str) -> Result<T, CacheError>
    where
        T: for<'de> Deserialize<'de>,
    {
        if let Some(bytes) = self.l1_cache.get(key).await {
            tracing::trace!("L1 cache hit: {}", key);
            return Ok(serde_json::from_slice(&bytes)?);
        }

        if let Some(redis) = &self.redis {
            let mut conn = redis.clone();
            let value: Option<String> = redis::cmd("GET")
                .arg(key)
                .query_async(&mut conn)
                .await?;

            if let Some(json) = value {
                tracing::trace!("L2 cache hit: {}", key);

                let bytes = json.as_bytes().to_vec();
                self.l1_cache.insert(key.to_string(), bytes).await;

                return Ok(serde_json::from_str(&json)?);
            }
        }

        tracing::trace!("Cache miss: {}", key);
        Err(CacheError::CacheMiss(key.to_string()))
    }

    /// Set a value in cache (both tiers)
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;

        self.l1_cache.insert(key.to_string(), json.as_bytes().to_vec()).await;

        if let Some(redis) = &self.redis {
            let mut conn = redis.clone();
            let _: () = redis::cmd("SETEX")
                .arg(key)
                .arg(self.ttl_secs)
                .arg(json)
                .query_async(&mut conn)
                .await?;
        }

        tracing::trace!("Cache set: {}", key);
        Ok(())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            l1_size: self.l1_cache.entry_count(),
            l2_enabled: self.redis.is_some(),
            ttl_secs: self.ttl_secs,
        }
    }
}

fn build_l1(l1_size: u64, ttl_secs: u64) -> moka::future::Cache<String, Vec<u8>> {
    moka::future::CacheBuilder::new(l1_size)
        .time_to_live(Duration::from_secs(ttl_secs))
        .build()
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub l1_size: u64,
    pub l2_enabled: bool,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a geocoded city
    pub fn geocode(city: &str, region: &str) -> String {
        format!("geocode:{}", place_key(city, region))
    }

    /// Key for a travel estimate; the pair is unordered so A→B and B→A share an entry
    pub fn travel(origin: &Location, destination: &Location) -> String {
        let a = place_key(&origin.city, &origin.region);
        let b = place_key(&destination.city, &destination.region);

        if a <= b {
            format!("travel:{}:{}", a, b)
        } else {
            format!("travel:{}:{}", b, a)
        }
    }
}

fn place_key(city: &str, region: &str) -> String {
    format!(
        "{}|{}",
        city.trim().to_ascii_lowercase(),
        region.trim().to_ascii_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "Requires Redis"]
    async fn test_redis_cache_set_get() {
        let cache = CacheManager::new("redis://127.0.0.1:6379", 1000, 60)
            .await
            .expect("Failed to create cache");

        cache.set("test_key", &"test_value").await.unwrap();
        let result: String = cache.get("test_key").await.unwrap();
        assert_eq!(result, "test_value");
        assert!(cache.stats().l2_enabled);
    }

    #[tokio::test]
    async fn test_in_memory_set_get() {
        let cache = CacheManager::in_memory(100, 60);

        cache.set("k", &42u32).await.unwrap();
        assert_eq!(cache.get::<u32>("k").await.unwrap(), 42);
        assert!(matches!(cache.get::<u32>("missing").await, Err(CacheError::CacheMiss(_))));
        assert!(!cache.stats().l2_enabled);
    }

    #[test]
    fn test_cache_key_builder() {
        let mumbai = Location::new("Mumbai", "Maharashtra");
        let delhi = Location::new(" Delhi", "DELHI");

        assert_eq!(CacheKey::geocode("Mumbai", "Maharashtra"), "geocode:mumbai|maharashtra");
        assert_eq!(CacheKey::travel(&mumbai, &delhi), CacheKey::travel(&delhi, &mumbai));
        assert_eq!(CacheKey::travel(&mumbai, &delhi), "travel:delhi|delhi:mumbai|maharashtra");
    }
}
