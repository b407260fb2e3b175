//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and geolocation.
//!
//! # Modules
//!
//! - [`cache`] - Link cache (Redis, in-memory and no-op implementations)
//! - [`geoip`] - MaxMind-backed IP geolocation
//! - [`persistence`] - PostgreSQL repository implementations

pub mod cache;
pub mod geoip;
pub mod persistence;
