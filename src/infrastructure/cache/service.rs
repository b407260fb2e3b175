//! Cache traits, key layout and the typed JSON cache used by the resolver.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::domain::entities::{GeoRule, Link};

/// Errors that can occur during cache operations.
///
/// They never leave the cache layer: [`LinkCache`] implementations log them
/// and degrade to a miss or a no-op.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Key of a cached link. The alias is lower-cased because lookups are
/// case-insensitive.
pub fn link_key(domain: &str, alias: &str) -> String {
    format!("link:{}:{}", domain, alias.to_lowercase())
}

/// Key of a cached geo-rule list.
pub fn geo_key(link_id: i64) -> String {
    format!("geo:{}", link_id)
}

/// Raw string key-value store with per-entry TTL.
#[async_trait]
pub trait CacheBackend: Send + Sync + 'static {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn ping(&self) -> bool;

    /// Short name used in logs and health output.
    fn name(&self) -> &'static str;
}

/// Typed, fail-open cache of links and their geo rules.
///
/// No method returns an error: a failing backend looks like an empty cache.
///
/// # Implementations
///
/// - [`JsonCache`] over [`crate::infrastructure::cache::RedisCache`] or
///   [`crate::infrastructure::cache::MemoryCache`]
/// - [`crate::infrastructure::cache::NullCache`] when caching is disabled
#[async_trait]
pub trait LinkCache: Send + Sync {
    async fn get_link(&self, domain: &str, alias: &str) -> Option<Link>;

    /// Stores a link; `ttl_seconds = None` uses the backend default.
    async fn set_link(&self, domain: &str, alias: &str, link: &Link, ttl_seconds: Option<u64>);

    async fn invalidate_link(&self, domain: &str, alias: &str);

    async fn get_geo_rules(&self, link_id: i64) -> Option<Vec<GeoRule>>;

    async fn set_geo_rules(&self, link_id: i64, rules: &[GeoRule], ttl_seconds: Option<u64>);

    async fn invalidate_geo_rules(&self, link_id: i64);

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    fn backend_name(&self) -> &'static str;
}

/// [`LinkCache`] storing serde JSON in any [`CacheBackend`].
///
/// Every backend call is bounded by `op_timeout`.
pub struct JsonCache<B> {
    backend: B,
    default_ttl: u64,
    op_timeout: Duration,
}

impl<B: CacheBackend> JsonCache<B> {
    pub fn new(backend: B, default_ttl_seconds: u64, op_timeout: Duration) -> Self {
        Self {
            backend,
            default_ttl: default_ttl_seconds,
            op_timeout,
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        let raw = timeout(self.op_timeout, self.backend.get(key))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))??;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn write<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let payload = serde_json::to_string(value)?;
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        timeout(self.op_timeout, self.backend.set(key, payload, ttl))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }

    async fn remove(&self, key: &str) -> CacheResult<()> {
        timeout(self.op_timeout, self.backend.delete(key))
            .await
            .map_err(|_| CacheError::Timeout(self.op_timeout))?
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, kind: &'static str) -> Option<T> {
        match self.read::<T>(key).await {
            Ok(Some(value)) => {
                debug!(key, "Cache HIT");
                metrics::counter!("cache_requests_total", "kind" => kind, "result" => "hit")
                    .increment(1);
                Some(value)
            }
            Ok(None) => {
                debug!(key, "Cache MISS");
                metrics::counter!("cache_requests_total", "kind" => kind, "result" => "miss")
                    .increment(1);
                None
            }
            Err(e) => {
                warn!(key, backend = self.backend.name(), error = %e, "Cache read failed");
                metrics::counter!("cache_requests_total", "kind" => kind, "result" => "error")
                    .increment(1);
                None
            }
        }
    }

    async fn store<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<u64>) {
        if let Err(e) = self.write(key, value, ttl).await {
            warn!(key, backend = self.backend.name(), error = %e, "Cache write failed");
        }
    }

    async fn evict(&self, key: &str) {
        match self.remove(key).await {
            Ok(()) => debug!(key, "Cache INVALIDATE"),
            Err(e) => warn!(key, backend = self.backend.name(), error = %e, "Cache delete failed"),
        }
    }
}

#[async_trait]
impl<B: CacheBackend> LinkCache for JsonCache<B> {
    async fn get_link(&self, domain: &str, alias: &str) -> Option<Link> {
        self.lookup(&link_key(domain, alias), "link").await
    }

    async fn set_link(&self, domain: &str, alias: &str, link: &Link, ttl_seconds: Option<u64>) {
        self.store(&link_key(domain, alias), link, ttl_seconds).await
    }

    async fn invalidate_link(&self, domain: &str, alias: &str) {
        self.evict(&link_key(domain, alias)).await
    }

    async fn get_geo_rules(&self, link_id: i64) -> Option<Vec<GeoRule>> {
        self.lookup(&geo_key(link_id), "geo").await
    }

    async fn set_geo_rules(&self, link_id: i64, rules: &[GeoRule], ttl_seconds: Option<u64>) {
        self.store(&geo_key(link_id), rules, ttl_seconds).await
    }

    async fn invalidate_geo_rules(&self, link_id: i64) {
        self.evict(&geo_key(link_id)).await
    }

    async fn health_check(&self) -> bool {
        timeout(self.op_timeout, self.backend.ping())
            .await
            .unwrap_or(false)
    }

    fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}
