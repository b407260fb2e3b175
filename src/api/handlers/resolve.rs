//! Handler for the resolution API.

use std::net::IpAddr;

use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
};
use serde_json::json;
use tracing::warn;
use validator::Validate;

use crate::api::dto::resolve::{ResolveQuery, ResolveResponse};
use crate::api::middleware::edge::{blocked_path, password_path};
use crate::application::services::{GeoHints, Resolution, ResolveRequest, VisitorRequest};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_safety::validate_destination;

/// Resolves a short link on behalf of an upstream edge.
///
/// # Endpoint
///
/// `GET /api/resolve?domain=&alias=&ip=&country=&city=&continent=`
///
/// # Response
///
/// ```json
/// { "url": "https://example.com/?utm_source=x", "cloaking": false }
/// ```
///
/// Password-protected links answer with `/password/{alias}` and blocked
/// visitors with a signed `/blocked?m=...&s=...`; both with `cloaking: false`.
///
/// # Errors
///
/// - **400**: missing or malformed parameters
/// - **404**: unknown, disabled or expired link, or an unusable destination
/// - **500**: store failure (no details)
pub async fn resolve_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ResolveQuery>,
) -> Result<Json<ResolveResponse>, AppError> {
    query.validate()?;

    let ip = match query.ip.as_deref().map(str::trim).filter(|ip| !ip.is_empty()) {
        Some(raw) => Some(raw.parse::<IpAddr>().map_err(|_| {
            AppError::bad_request("Invalid IP address", json!({ "ip": raw }))
        })?),
        None => None,
    };

    let header = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());

    let visitor = state.visitors.inspect(VisitorRequest {
        ip,
        user_agent: header(header::USER_AGENT),
        referer: header(header::REFERER),
        hints: GeoHints {
            country: query.country,
            city: query.city,
            continent: query.continent,
        },
    });

    let request = ResolveRequest::new(
        query.domain.unwrap_or_default(),
        query.alias.unwrap_or_default(),
        visitor,
    );

    let response = match state.resolver.resolve(request).await? {
        Resolution::NotFound => {
            return Err(AppError::not_found("Link not found", json!({})));
        }
        Resolution::PasswordRequired { alias } => ResolveResponse {
            url: password_path(&alias),
            cloaking: false,
        },
        Resolution::Blocked { message, .. } => ResolveResponse {
            url: blocked_path(message.as_deref(), &state.pages),
            cloaking: false,
        },
        Resolution::Redirect {
            destination,
            cloaking,
            ..
        } => {
            let url = validate_destination(&destination).map_err(|e| {
                warn!(destination = %destination, error = %e, "Refusing unsafe destination");
                AppError::not_found("Link not found", json!({}))
            })?;
            ResolveResponse {
                url: url.to_string(),
                cloaking,
            }
        }
    };

    Ok(Json(response))
}
