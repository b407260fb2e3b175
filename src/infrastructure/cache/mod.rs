//! Caching layer for fast link lookups.
//!
//! Provides the fail-open [`LinkCache`] trait with these implementations:
//! - [`JsonCache`] over [`RedisCache`] - Production Redis-backed cache
//! - [`JsonCache`] over [`MemoryCache`] - In-process fallback
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod redis_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use redis_cache::RedisCache;
pub use service::{
    CacheBackend, CacheError, CacheResult, JsonCache, LinkCache, geo_key, link_key,
};
