//! Read-through JSON cache
//!
//! `CacheService` stores JSON values under namespaced keys in Redis, in
//! process memory, or nowhere at all. Cache failures never fail a request:
//! reads degrade to misses and writes are dropped with a warning.
//!
//! `cached` adds a short `{key}:lock` so that, when a hot key expires, one
//! caller recomputes it while the others wait briefly for the fresh value.

mod memory_store;
mod redis_store;

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use memory_store::MemoryCacheStore;
pub use redis_store::RedisCacheStore;

/// How long a recompute lock is held at most
const LOCK_TTL_MILLIS: u64 = 5_000;
/// How long a caller without the lock waits before re-reading
const LOCK_WAIT: Duration = Duration::from_millis(50);

#[derive(Clone, Debug)]
enum CacheBackend {
    Disabled,
    Memory(MemoryCacheStore),
    Redis(RedisCacheStore),
}

#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    ttl: Duration,
    backend: CacheBackend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            ttl: Duration::ZERO,
            backend: CacheBackend::Disabled,
        }
    }

    pub fn memory(prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key_prefix: prefix.into(),
            ttl,
            backend: CacheBackend::Memory(MemoryCacheStore::default()),
        }
    }

    pub fn redis(store: RedisCacheStore, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            key_prefix: prefix.into(),
            ttl,
            backend: CacheBackend::Redis(store),
        }
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    /// Default time-to-live of cached values
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn raw_get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        match &self.backend {
            CacheBackend::Disabled => Ok(None),
            CacheBackend::Memory(store) => store.get(key).await,
            CacheBackend::Redis(store) => store.get(key).await,
        }
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.raw_get(key).await? {
            Some(bytes) => {
                let parsed = serde_json::from_slice(&bytes).map_err(|e| {
                    anyhow::anyhow!("failed to deserialize cache value for `{key}`: {e}")
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    pub async fn set_json<T>(&self, key: &str, value: &T, ttl: Duration) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let ttl_seconds = ttl.as_secs().max(1);
        let payload = serde_json::to_vec(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;

        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Memory(store) => store.set(key, payload, ttl_seconds).await,
            CacheBackend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            CacheBackend::Disabled => Ok(()),
            CacheBackend::Memory(store) => store.del(key).await,
            CacheBackend::Redis(store) => store.del(key).await,
        }
    }

    /// Remove a key, logging instead of failing
    pub async fn clear(&self, key: &str) {
        if let Err(e) = self.del(key).await {
            warn!(?e, cache_key = key, "cache clear failed");
        }
    }

    async fn acquire_lock(&self, key: &str) -> bool {
        let lock_key = format!("{key}:lock");
        let acquired = match &self.backend {
            CacheBackend::Disabled => Ok(true),
            CacheBackend::Memory(store) => store.set_nx(&lock_key, LOCK_TTL_MILLIS).await,
            CacheBackend::Redis(store) => store.set_nx(&lock_key, LOCK_TTL_MILLIS).await,
        };
        acquired.unwrap_or_else(|e| {
            warn!(?e, cache_key = key, "cache lock failed; computing anyway");
            false
        })
    }

    async fn read_fail_open<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get_json::<T>(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(?e, cache_key = key, "cache get failed; falling back to source");
                None
            }
        }
    }

    /// Read `key` through the cache, computing and storing it on a miss
    ///
    /// A caller that cannot take the recompute lock waits once for the
    /// holder to publish the value before computing it itself.
    pub async fn cached<T, E, F, Fut>(&self, key: &str, loader: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.read_fail_open(key).await {
            return Ok(hit);
        }

        let has_lock = self.acquire_lock(key).await;
        if !has_lock {
            tokio::time::sleep(LOCK_WAIT).await;
            if let Some(hit) = self.read_fail_open(key).await {
                return Ok(hit);
            }
        }

        let loaded = loader().await;

        // `None` results stay uncached so a later insert is seen at once
        if let Ok(value) = &loaded {
            let is_null = serde_json::to_value(value).map_or(false, |v| v.is_null());
            if !is_null {
                if let Err(e) = self.set_json(key, value, self.ttl).await {
                    warn!(?e, cache_key = key, "cache set failed; returning source value");
                }
            }
        }
        if has_lock && !matches!(self.backend, CacheBackend::Disabled) {
            self.clear(&format!("{key}:lock")).await;
        }

        loaded
    }
}
