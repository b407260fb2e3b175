//! Core domain entities.
//!
//! Entities are plain data structures with a few invariant-checking helpers.
//!
//! # Entity Types
//!
//! - [`Link`] - A short alias under a domain, with its redirect policies
//! - [`GeoRule`] - A country/continent rule attached to a link
//! - [`NewClick`] - An analytics event to append
//! - [`VisitorContext`] - What is known about the current visitor

pub mod click;
pub mod geo_rule;
pub mod link;
pub mod visitor;

pub use click::{NewClick, TriggerKind};
pub use geo_rule::{GeoRule, RuleAction, RuleCondition, RuleType};
pub use link::{Link, UtmParams};
pub use visitor::{DeviceInfo, GeoInfo, VisitorContext, normalize_geo_value};
