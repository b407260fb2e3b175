//! Domain layer containing business entities and logic.
//!
//! Everything here is independent of HTTP, Postgres and Redis. Storage is
//! reached only through the traits in [`repositories`].
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`continents`] - Static country to continent table
//! - [`geo_matcher`] - Pure geo-rule evaluation
//! - [`click_event`] - Click job passed to the background recorder
//! - [`click_worker`] - Click queue and asynchronous processing worker
//!
//! # Click Processing Flow
//!
//! 1. The resolver decides on an outcome for a visitor
//! 2. A [`click_event::ClickJob`] is offered to the [`click_worker::ClickQueue`]
//! 3. [`click_worker::run_click_worker`] drains the queue with bounded concurrency
//! 4. [`crate::application::services::ClickRecorder`] persists the click and unique visit

pub mod click_event;
pub mod click_worker;
pub mod continents;
pub mod entities;
pub mod geo_matcher;
pub mod repositories;
