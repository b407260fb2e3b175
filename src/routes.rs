//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{alias}`           - Handled by the edge dispatcher (any host)
//! - `GET  /health`            - Health check: DB, cache, click queue
//! - `GET  /api/resolve`       - Resolution API (rate limited)
//! - `GET  /password/{alias}`  - Password prompt; `POST` verifies
//! - `GET  /cloak?d=&s=`       - Cloaking frame (signed parameter)
//! - `GET  /blocked?m=&s=`     - Geo block page (signed parameter)
//! - anything else             - Not-found page
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling
//! - **Edge dispatcher** - Runs before routing so rewrites are re-routed
//! - **Rate limiting** - Per-IP token bucket on `/api` and password submissions

use crate::api::handlers::{
    blocked_handler, cloak_handler, health_handler, not_found_handler, password_form_handler,
    password_submit_handler,
};
use crate::api::middleware::{edge, rate_limit, tracing};
use crate::api::routes::api_routes;
use crate::state::AppState;
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Application routes without the edge dispatcher.
pub fn inner_router(state: AppState) -> Router {
    let api = api_routes().layer(rate_limit::layer(state.behind_proxy));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/password/{alias}",
            get(password_form_handler).post(axum::handler::Handler::layer(
                password_submit_handler,
                rate_limit::password_layer(state.behind_proxy),
            )),
        )
        .route("/cloak", get(cloak_handler))
        .route("/blocked", get(blocked_handler))
        .nest("/api", api)
        .fallback(not_found_handler)
        .with_state(state)
}

/// Wraps the application routes in the edge dispatcher.
///
/// The dispatcher sits on a router whose only service is the fallback, so
/// it sees every request before the inner router matches a route.
pub fn edge_router(state: AppState) -> Router {
    let inner = inner_router(state.clone());

    Router::new()
        .fallback_service(inner)
        .layer(middleware::from_fn_with_state(state, edge::layer))
        .layer(tracing::layer())
}

/// Constructs the complete application service.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(edge_router(state))
}
