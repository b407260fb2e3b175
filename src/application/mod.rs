//! Application layer services implementing business logic.
//!
//! Services consume repository traits and the injected cache and click
//! queue, and expose a small API to the HTTP layer.
//!
//! # Available Services
//!
//! - [`services::resolution_service::ResolutionService`] - Link resolution decisions
//! - [`services::click_recorder::ClickRecorder`] - Click and unique-visit persistence
//! - [`services::visitor_service::VisitorService`] - Visitor geo/device inference

pub mod services;
