//! API route configuration.

use crate::api::handlers::resolve_handler;
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public JSON API, mounted under `/api`.
///
/// # Endpoints
///
/// - `GET /resolve` - Resolve `(domain, alias)` for an upstream edge
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/resolve", get(resolve_handler))
}
