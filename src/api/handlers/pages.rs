//! Internal pages the edge dispatcher rewrites to.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::state::AppState;
use crate::utils::page_signer::SignedPage;
use crate::utils::url_safety::decode_cloak_param;

const DEFAULT_BLOCK_MESSAGE: &str = "This link is not available in your region.";

#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {}

#[derive(Template, WebTemplate)]
#[template(path = "blocked.html")]
struct BlockedTemplate {
    message: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "cloak.html")]
struct CloakTemplate {
    title: String,
    destination: String,
}

#[derive(Debug, Deserialize)]
pub struct CloakQuery {
    pub d: Option<String>,
    pub s: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockedQuery {
    pub m: Option<String>,
    pub s: Option<String>,
}

/// Renders the generic not-found page with status 404.
pub fn not_found_page() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, NotFoundTemplate {})
}

/// Router fallback.
pub async fn not_found_handler() -> impl IntoResponse {
    not_found_page()
}

/// Frames a destination so the short URL stays in the address bar.
///
/// # Endpoint
///
/// `GET /cloak?d=<base64url destination>&s=<signature>`
///
/// Only parameters signed by this service are served. The destination is
/// decoded and validated again; anything that is not an http(s) URL
/// renders the not-found page.
pub async fn cloak_handler(
    State(state): State<AppState>,
    Query(query): Query<CloakQuery>,
) -> Response {
    let (Some(param), Some(signature)) = (query.d.as_deref(), query.s.as_deref()) else {
        return not_found_page().into_response();
    };
    if !state.pages.verify(SignedPage::Cloak, param, signature) {
        debug!("Rejected unsigned cloak parameter");
        return not_found_page().into_response();
    }

    match decode_cloak_param(param) {
        Ok(url) => {
            let title = url.host_str().unwrap_or("Redirecting").to_string();
            CloakTemplate {
                title,
                destination: url.to_string(),
            }
            .into_response()
        }
        Err(e) => {
            debug!(error = %e, "Rejected cloak parameter");
            not_found_page().into_response()
        }
    }
}

/// Renders the block page with the rule's message, or a default one.
///
/// # Endpoint
///
/// `GET /blocked?m=<message>&s=<signature>`
///
/// Requests without a valid signature render the not-found page.
pub async fn blocked_handler(
    State(state): State<AppState>,
    Query(query): Query<BlockedQuery>,
) -> Response {
    let raw = query.m.as_deref().unwrap_or_default();
    let signed = query
        .s
        .as_deref()
        .is_some_and(|sig| state.pages.verify(SignedPage::Blocked, raw, sig));
    if !signed {
        debug!("Rejected unsigned block page request");
        return not_found_page().into_response();
    }

    let message = Some(raw.trim())
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_BLOCK_MESSAGE)
        .to_string();

    (StatusCode::FORBIDDEN, BlockedTemplate { message }).into_response()
}
