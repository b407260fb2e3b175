//! Password prompt for protected links.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    http::{Extensions, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::info;

use crate::api::handlers::pages::not_found_page;
use crate::api::middleware::edge::{EdgeAction, decide, request_visitor};
use crate::application::services::ResolveRequest;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::extract_domain::extract_domain_from_headers;

#[derive(Template, WebTemplate)]
#[template(path = "password.html")]
struct PasswordTemplate {
    alias: String,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub password: String,
}

/// Renders the password prompt. Reveals nothing about the link.
///
/// # Endpoint
///
/// `GET /password/{alias}`
pub async fn password_form_handler(Path(alias): Path<String>) -> impl IntoResponse {
    PasswordTemplate { alias, error: None }
}

/// Verifies the password and continues resolution past the password gate.
///
/// # Endpoint
///
/// `POST /password/{alias}` (form field `password`)
///
/// # Responses
///
/// - **303 See Other**: to the destination, or to the cloak/block page
/// - **401 Unauthorized**: wrong password, prompt rendered again
/// - **404 Not Found**: unknown, disabled or expired link
///
/// Clicks on password-protected links are never recorded.
pub async fn password_submit_handler(
    State(state): State<AppState>,
    Path(alias): Path<String>,
    headers: HeaderMap,
    extensions: Extensions,
    Form(form): Form<PasswordForm>,
) -> Result<Response, AppError> {
    let host = extract_domain_from_headers(&headers)?;

    let verified = match state
        .resolver
        .verify_link_password(&host, &alias, &form.password)
        .await
    {
        Ok(verified) => verified,
        Err(AppError::NotFound { .. }) => return Ok(not_found_page().into_response()),
        Err(e) => return Err(e),
    };

    if !verified {
        info!(alias = %alias, "Wrong link password");
        let page = PasswordTemplate {
            alias,
            error: Some("Incorrect password.".to_string()),
        };
        return Ok((StatusCode::UNAUTHORIZED, page).into_response());
    }

    let visitor = request_visitor(&state, &headers, &extensions);
    let mut request = ResolveRequest::new(host.as_str(), alias, visitor);
    request.password_verified = true;

    let resolution = state.resolver.resolve(request).await?;
    let domain = state.resolver.normalize_domain(&host);

    let response = match decide(resolution, &domain, &state.pages) {
        EdgeAction::Redirect(location) | EdgeAction::Rewrite(location) => {
            Redirect::to(&location).into_response()
        }
        EdgeAction::PassThrough => not_found_page().into_response(),
    };

    Ok(response)
}
