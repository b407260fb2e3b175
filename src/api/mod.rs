//! HTTP layer: request/response handling and the edge dispatcher.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - HTTP request handlers and internal pages
//! - [`middleware`] - Edge dispatcher, rate limiting and tracing
//! - [`routes`] - JSON API route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
