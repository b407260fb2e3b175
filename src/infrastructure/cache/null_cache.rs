//! No-op cache implementation for disabled caching.

use super::service::LinkCache;
use crate::domain::entities::{GeoRule, Link};
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when `CACHE_ENABLED=false`. Every read is a miss, so each request
/// goes to the store.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkCache for NullCache {
    async fn get_link(&self, _domain: &str, _alias: &str) -> Option<Link> {
        None
    }

    async fn set_link(&self, _domain: &str, _alias: &str, _link: &Link, _ttl: Option<u64>) {}

    async fn invalidate_link(&self, _domain: &str, _alias: &str) {}

    async fn get_geo_rules(&self, _link_id: i64) -> Option<Vec<GeoRule>> {
        None
    }

    async fn set_geo_rules(&self, _link_id: i64, _rules: &[GeoRule], _ttl: Option<u64>) {}

    async fn invalidate_geo_rules(&self, _link_id: i64) {}

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "disabled"
    }
}
