//! Cache store with a local (DashMap) mode and a shared (Redis) mode.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use deadpool_redis::{Pool, PoolConfig, Runtime};
use redis::AsyncCommands;
use userclient_core::{Cache, CacheError};

use crate::config::RedisConfig;

/// A cached entry with TTL support.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<Vec<u8>>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    pub fn new(data: Vec<u8>, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// Key-value store backing the user cache.
///
/// ## Cache Modes
///
/// - **Local**: per-process DashMap, entries expire after `ttl`
/// - **Redis**: shared across instances, entries written with `SETEX`
///
/// Redis mode keeps no local tier, so every instance sees a logout's
/// deletions immediately.
#[derive(Clone)]
pub enum CacheBackend {
    Local {
        entries: Arc<DashMap<String, CachedEntry>>,
        ttl: Duration,
    },
    Redis {
        pool: Pool,
        ttl: Duration,
    },
}

impl CacheBackend {
    pub fn new_local(ttl: Duration) -> Self {
        CacheBackend::Local {
            entries: Arc::new(DashMap::new()),
            ttl,
        }
    }

    pub fn new_redis(pool: Pool, ttl: Duration) -> Self {
        CacheBackend::Redis { pool, ttl }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            CacheBackend::Local { .. } => "local",
            CacheBackend::Redis { .. } => "redis",
        }
    }

    /// Number of live local entries. Always 0 in Redis mode.
    pub fn local_len(&self) -> usize {
        match self {
            CacheBackend::Local { entries, .. } => {
                entries.iter().filter(|entry| !entry.is_expired()).count()
            }
            CacheBackend::Redis { .. } => 0,
        }
    }

    async fn connection(pool: &Pool) -> Result<deadpool_redis::Connection, CacheError> {
        pool.get()
            .await
            .map_err(|e| CacheError::Connection(e.to_string()))
    }
}

#[async_trait]
impl Cache for CacheBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match self {
            CacheBackend::Local { entries, .. } => {
                let Some(entry) = entries.get(key) else {
                    return Ok(None);
                };
                if entry.is_expired() {
                    drop(entry);
                    entries.remove(key);
                    return Ok(None);
                }
                Ok(Some(entry.data.as_ref().clone()))
            }
            CacheBackend::Redis { pool, .. } => {
                let mut conn = Self::connection(pool).await?;
                conn.get::<_, Option<Vec<u8>>>(key)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local { entries, ttl } => {
                entries.insert(key.to_string(), CachedEntry::new(value, *ttl));
                Ok(())
            }
            CacheBackend::Redis { pool, ttl } => {
                let mut conn = Self::connection(pool).await?;
                let ttl_secs = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, ttl_secs)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))?;
                tracing::trace!(key_len = key.len(), ttl_secs, "cache set (redis)");
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        match self {
            CacheBackend::Local { entries, .. } => {
                entries.remove(key);
                Ok(())
            }
            CacheBackend::Redis { pool, .. } => {
                let mut conn = Self::connection(pool).await?;
                conn.del::<_, ()>(key)
                    .await
                    .map_err(|e| CacheError::Command(e.to_string()))
            }
        }
    }
}

/// Builds a Redis connection pool from configuration.
pub fn create_redis_pool(config: &RedisConfig) -> Result<Pool, CacheError> {
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut pool_config = PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);
    pool_config.timeouts.recycle = Some(timeout);

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    redis_config.pool = Some(pool_config);
    redis_config
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| CacheError::Connection(e.to_string()))
}

/// Creates the cache store described by `config`.
///
/// Falls back to the local store when Redis is disabled, the pool cannot be
/// built, or no connection can be obtained.
pub async fn create_cache_backend(config: &RedisConfig, ttl: Duration) -> CacheBackend {
    if !config.enabled {
        tracing::info!("Redis disabled, using local cache only");
        return CacheBackend::new_local(ttl);
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let pool = match create_redis_pool(config) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create Redis pool. Falling back to local cache.");
            return CacheBackend::new_local(ttl);
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            CacheBackend::new_redis(pool, ttl)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to connect to Redis. Falling back to local cache.");
            CacheBackend::new_local(ttl)
        }
    }
}
