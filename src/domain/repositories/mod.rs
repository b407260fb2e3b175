//! Repository trait definitions for the domain layer.
//!
//! These traits abstract the relational store. They are implemented in
//! `crate::infrastructure::persistence` and auto-mocked via `mockall` for
//! unit tests.
//!
//! # Available Repositories
//!
//! - [`LinkRepository`] - Link lookups and the one-way disable flip
//! - [`GeoRuleRepository`] - Geo rules attached to a link
//! - [`ClickRepository`] - Click events and unique-visit markers
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod click_repository;
pub mod geo_rule_repository;
pub mod link_repository;

pub use click_repository::ClickRepository;
pub use geo_rule_repository::GeoRuleRepository;
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use geo_rule_repository::MockGeoRuleRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
