//! HTTP request handlers.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod pages;
pub mod password;
pub mod resolve;

pub use health::health_handler;
pub use pages::{blocked_handler, cloak_handler, not_found_handler};
pub use password::{password_form_handler, password_submit_handler};
pub use resolve::resolve_handler;
