//! Business logic services for the application layer.

pub mod click_recorder;
pub mod resolution_service;
pub mod visitor_service;

pub use click_recorder::{ClickRecorder, RecordOutcome, SkipReason};
pub use resolution_service::{PgResolutionService, Resolution, ResolutionService, ResolveRequest};
pub use visitor_service::{GeoHints, VisitorRequest, VisitorService};
