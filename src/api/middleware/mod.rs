//! HTTP middleware for request processing and protection.
//!
//! Provides the edge dispatcher, rate limiting, and observability middleware.

pub mod edge;
pub mod rate_limit;
pub mod tracing;
