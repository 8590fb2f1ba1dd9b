mod backend;

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use backend::{NoopStore, RedisStore};

/// TTL for cached per-guild configuration rows.
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(300);

pub fn guild_config_key(cache: &CacheService, guild_id: u64) -> String {
    cache.key(format!("guild_config:{guild_id}"))
}

pub async fn invalidate_guild_config(cache: &CacheService, guild_id: u64) -> anyhow::Result<()> {
    cache.del(&guild_config_key(cache, guild_id)).await
}

#[derive(Clone, Debug)]
enum Backend {
    Disabled(NoopStore),
    Redis(RedisStore),
}

/// Read-through JSON cache in front of the database.
///
/// The disabled backend answers every read with a miss, so cached call
/// sites behave identically with or without Redis configured.
#[derive(Clone, Debug)]
pub struct CacheService {
    key_prefix: String,
    backend: Backend,
}

impl CacheService {
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: prefix.into(),
            backend: Backend::Disabled(NoopStore),
        }
    }

    pub fn redis(redis_url: &str, prefix: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            key_prefix: prefix.into(),
            backend: Backend::Redis(RedisStore::from_url(redis_url)?),
        })
    }

    pub fn is_redis_enabled(&self) -> bool {
        matches!(self.backend, Backend::Redis(_))
    }

    pub fn key(&self, suffix: impl AsRef<str>) -> String {
        format!("{}:{}", self.key_prefix, suffix.as_ref())
    }

    /// Round-trip health check. A no-op without Redis.
    pub async fn ping(&self) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Disabled(_) => Ok(()),
            Backend::Redis(store) => store.ping().await,
        }
    }

    pub async fn get_json<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let raw = match &self.backend {
            Backend::Disabled(store) => store.get(key).await,
            Backend::Redis(store) => store.get(key).await,
        }?;

        match raw {
            Some(payload) => {
                let parsed = serde_json::from_str(&payload).map_err(|e| {
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
        let payload = serde_json::to_string(value)
            .map_err(|e| anyhow::anyhow!("failed to serialize cache value for `{key}`: {e}"))?;
        let ttl_seconds = ttl.as_secs().max(1);

        match &self.backend {
            Backend::Disabled(store) => store.set(key, payload, ttl_seconds).await,
            Backend::Redis(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    pub async fn del(&self, key: &str) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Disabled(store) => store.del(key).await,
            Backend::Redis(store) => store.del(key).await,
        }
    }

    /// Serve `key` from cache, or run `loader` and cache its result.
    ///
    /// Cache failures degrade to the loader instead of surfacing: a broken
    /// Redis must never take the database path down with it.
    pub async fn get_or_load_json<T, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        loader: F,
    ) -> anyhow::Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        match self.get_json::<T>(key).await {
            Ok(Some(cached)) => return Ok(cached),
            Ok(None) => {}
            Err(e) => warn!(?e, cache_key = key, "cache get failed; loading from database"),
        }

        let loaded = loader().await?;

        if let Err(e) = self.set_json(key, &loaded, ttl).await {
            warn!(?e, cache_key = key, "cache set failed; returning database value");
        }

        Ok(loaded)
    }
}
