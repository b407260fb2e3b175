//! Utility functions for request handling, URL processing and hashing.
//!
//! - [`client_ip`] - Client IP extraction behind proxies
//! - [`extract_domain`] - Domain extraction from headers and normalization
//! - [`ip_hash`] - Keyed IP hashing
//! - [`page_signer`] - Signed parameters for the internal pages
//! - [`password`] - Argon2 password hashing
//! - [`url_safety`] - Destination validation and cloak parameter encoding
//! - [`user_agent`] - Device inference and bot detection
//! - [`utm`] - UTM parameter rewriting

pub mod client_ip;
pub mod extract_domain;
pub mod ip_hash;
pub mod page_signer;
pub mod password;
pub mod url_safety;
pub mod user_agent;
pub mod utm;
