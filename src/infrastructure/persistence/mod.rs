//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Link lookups and disabling
//! - [`PgGeoRuleRepository`] - Geo rules per link
//! - [`PgClickRepository`] - Click events and unique visits

pub mod pg_click_repository;
pub mod pg_geo_rule_repository;
pub mod pg_link_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_geo_rule_repository::PgGeoRuleRepository;
pub use pg_link_repository::PgLinkRepository;
