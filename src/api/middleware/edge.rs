//! Edge dispatcher: turns `/{alias}` requests on any route into a redirect,
//! an internal rewrite, or a pass-through to the router.
//!
//! Runs in front of routing so that a rewrite (`/cloak?d=...`,
//! `/blocked?m=...`) is routed like a fresh request.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{Extensions, HeaderMap, Method, Uri, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::application::services::{GeoHints, Resolution, ResolveRequest, VisitorRequest};
use crate::domain::entities::VisitorContext;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::extract_domain::extract_domain_from_headers;
use crate::utils::page_signer::{PageSigner, SignedPage};
use crate::utils::url_safety::{can_cloak, encode_cloak_param, validate_destination};
use crate::utils::user_agent::is_bot;

/// First path segments owned by the application itself.
const RESERVED_PREFIXES: &[&str] = &[
    "api",
    "app",
    "dashboard",
    "static",
    "health",
    "password",
    "blocked",
    "cloak",
];

const STATIC_EXTENSIONS: &[&str] = &[
    "ico",
    "png",
    "jpg",
    "jpeg",
    "gif",
    "svg",
    "webp",
    "avif",
    "css",
    "js",
    "map",
    "txt",
    "xml",
    "json",
    "webmanifest",
    "woff",
    "woff2",
    "ttf",
];

/// What the dispatcher does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeAction {
    /// Hand the request to the router unchanged.
    PassThrough,
    /// `307 Temporary Redirect` to the location.
    Redirect(String),
    /// Route the request as if it had been made to this path.
    Rewrite(String),
}

/// Returns the alias candidate for a request path, or `None` when the path
/// belongs to the application, is a static asset, or has more than one
/// segment.
pub fn classify_path(path: &str) -> Option<&str> {
    let segment = path.strip_prefix('/')?;
    if segment.is_empty() || segment.contains('/') || segment.starts_with('_') {
        return None;
    }
    if RESERVED_PREFIXES
        .iter()
        .any(|p| segment.eq_ignore_ascii_case(p))
    {
        return None;
    }
    if let Some((_, ext)) = segment.rsplit_once('.')
        && STATIC_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    {
        return None;
    }
    Some(segment)
}

pub fn password_path(alias: &str) -> String {
    format!("/password/{alias}")
}

/// Block page path; the message travels form-encoded in `m`, the
/// signature in `s`.
pub fn blocked_path(message: Option<&str>, pages: &PageSigner) -> String {
    let signature = pages.sign(SignedPage::Blocked, message.unwrap_or_default());
    match message {
        Some(message) => {
            let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
            format!("/blocked?m={encoded}&s={signature}")
        }
        None => format!("/blocked?s={signature}"),
    }
}

pub fn cloak_path(destination: &str, pages: &PageSigner) -> String {
    let param = encode_cloak_param(destination);
    let signature = pages.sign(SignedPage::Cloak, &param);
    format!("/cloak?d={param}&s={signature}")
}

/// Maps a resolution onto an edge action.
///
/// Destinations are re-validated here: anything that is not http(s) after
/// the `https://` retry passes through to the not-found page. Cloaking is
/// skipped when the destination is the requesting domain itself.
pub fn decide(resolution: Resolution, request_domain: &str, pages: &PageSigner) -> EdgeAction {
    match resolution {
        Resolution::NotFound => EdgeAction::PassThrough,
        Resolution::PasswordRequired { alias } => EdgeAction::Redirect(password_path(&alias)),
        Resolution::Blocked { message, .. } => {
            EdgeAction::Rewrite(blocked_path(message.as_deref(), pages))
        }
        Resolution::Redirect {
            destination,
            cloaking,
            ..
        } => match validate_destination(&destination) {
            Ok(url) if cloaking && can_cloak(&url, request_domain) => {
                EdgeAction::Rewrite(cloak_path(url.as_str(), pages))
            }
            Ok(url) => EdgeAction::Redirect(url.to_string()),
            Err(e) => {
                warn!(destination = %destination, error = %e, "Refusing unsafe destination");
                EdgeAction::PassThrough
            }
        },
    }
}

/// HEAD requests and browser prefetch/prerender hints.
pub fn is_probe(method: &Method, headers: &HeaderMap) -> bool {
    if method == Method::HEAD {
        return true;
    }
    ["purpose", "sec-purpose", "x-purpose", "x-moz"]
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .any(|v| {
            let v = v.to_ascii_lowercase();
            v.contains("prefetch") || v.contains("preview") || v.contains("prerender")
        })
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Builds the visitor context for an incoming request.
///
/// The peer address comes from `ConnectInfo` when the server provides it.
pub fn request_visitor(
    state: &AppState,
    headers: &HeaderMap,
    extensions: &Extensions,
) -> VisitorContext {
    let peer = extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let user_agent = header_string(headers, header::USER_AGENT);
    let referer = header_string(headers, header::REFERER);

    state.visitors.inspect(VisitorRequest {
        ip: client_ip(headers, peer, state.behind_proxy),
        user_agent: user_agent.as_deref(),
        referer: referer.as_deref(),
        hints: GeoHints::from_headers(headers, state.behind_proxy),
    })
}

/// Edge dispatcher middleware.
///
/// # Flow
///
/// 1. Skip reserved paths, assets, multi-segment paths and bots
/// 2. Build the visitor context (client IP, geo headers, user agent)
/// 3. Resolve and apply the resulting [`EdgeAction`]
///
/// Resolution errors never fail the request; they pass through.
pub async fn layer(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    if !matches!(*req.method(), Method::GET | Method::HEAD) {
        return next.run(req).await;
    }
    let Some(alias) = classify_path(req.uri().path()).map(str::to_string) else {
        return next.run(req).await;
    };

    let headers = req.headers();
    let user_agent = header_string(headers, header::USER_AGENT);
    if user_agent.as_deref().is_some_and(is_bot) {
        debug!(alias = %alias, "Bot request passed through");
        return next.run(req).await;
    }

    let Ok(host) = extract_domain_from_headers(headers) else {
        return next.run(req).await;
    };

    let visitor = request_visitor(&state, headers, req.extensions());

    let mut request = ResolveRequest::new(host.as_str(), alias, visitor);
    request.probe = is_probe(req.method(), headers);

    let resolution = match state.resolver.resolve(request).await {
        Ok(resolution) => resolution,
        Err(e) => {
            warn!(error = %e, "Edge resolution failed, passing through");
            return next.run(req).await;
        }
    };

    let domain = state.resolver.normalize_domain(&host);
    match decide(resolution, &domain, &state.pages) {
        EdgeAction::PassThrough => next.run(req).await,
        EdgeAction::Redirect(location) => Redirect::temporary(&location).into_response(),
        EdgeAction::Rewrite(target) => match target.parse::<Uri>() {
            Ok(uri) => {
                *req.uri_mut() = uri;
                next.run(req).await
            }
            Err(e) => {
                warn!(rewrite = %target, error = %e, "Invalid rewrite target");
                next.run(req).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn signer() -> PageSigner {
        PageSigner::new("test-secret")
    }

    #[test]
    fn test_classify_path_candidates() {
        assert_eq!(classify_path("/abc"), Some("abc"));
        assert_eq!(classify_path("/My-Link_2"), Some("My-Link_2"));
        assert_eq!(classify_path("/v1.2"), Some("v1.2"));
    }

    #[test]
    fn test_classify_path_pass_through() {
        for path in [
            "/",
            "",
            "/api",
            "/api/resolve",
            "/health",
            "/Dashboard",
            "/_next",
            "/static/app.css",
            "/favicon.ico",
            "/robots.txt",
            "/cloak",
            "/password/abc",
            "/blocked",
            "/a/b",
        ] {
            assert_eq!(classify_path(path), None, "path = {path:?}");
        }
    }

    #[test]
    fn test_decide_redirect() {
        let action = decide(
            Resolution::Redirect {
                destination: "https://example.com/page".to_string(),
                cloaking: false,
                rule_id: None,
            },
            "s.example.com",
            &signer(),
        );
        assert_eq!(
            action,
            EdgeAction::Redirect("https://example.com/page".to_string())
        );
    }

    #[test]
    fn test_decide_adds_https_prefix() {
        let action = decide(
            Resolution::Redirect {
                destination: "example.com/page".to_string(),
                cloaking: false,
                rule_id: None,
            },
            "s.example.com",
            &signer(),
        );
        assert_eq!(
            action,
            EdgeAction::Redirect("https://example.com/page".to_string())
        );
    }

    #[test]
    fn test_decide_never_redirects_to_javascript() {
        let action = decide(
            Resolution::Redirect {
                destination: "javascript:alert(1)".to_string(),
                cloaking: false,
                rule_id: None,
            },
            "s.example.com",
            &signer(),
        );
        assert_eq!(action, EdgeAction::PassThrough);
    }

    #[test]
    fn test_decide_cloaking_rewrites() {
        let action = decide(
            Resolution::Redirect {
                destination: "https://example.com/".to_string(),
                cloaking: true,
                rule_id: None,
            },
            "s.example.com",
            &signer(),
        );
        assert_eq!(
            action,
            EdgeAction::Rewrite(cloak_path("https://example.com/", &signer()))
        );
    }

    #[test]
    fn test_decide_does_not_cloak_own_domain() {
        let action = decide(
            Resolution::Redirect {
                destination: "https://s.example.com/other".to_string(),
                cloaking: true,
                rule_id: None,
            },
            "s.example.com",
            &signer(),
        );
        assert_eq!(
            action,
            EdgeAction::Redirect("https://s.example.com/other".to_string())
        );
    }

    #[test]
    fn test_decide_password_and_block() {
        let pages = signer();
        assert_eq!(
            decide(
                Resolution::PasswordRequired {
                    alias: "secret".to_string()
                },
                "s.example.com",
                &pages
            ),
            EdgeAction::Redirect("/password/secret".to_string())
        );

        let message = "Not available in your region";
        assert_eq!(
            decide(
                Resolution::Blocked {
                    message: Some(message.to_string()),
                    rule_id: 1
                },
                "s.example.com",
                &pages
            ),
            EdgeAction::Rewrite(format!(
                "/blocked?m=Not+available+in+your+region&s={}",
                pages.sign(SignedPage::Blocked, message)
            ))
        );
        assert_eq!(
            decide(
                Resolution::Blocked {
                    message: None,
                    rule_id: 1
                },
                "s.example.com",
                &pages
            ),
            EdgeAction::Rewrite(format!("/blocked?s={}", pages.sign(SignedPage::Blocked, "")))
        );
        assert_eq!(
            decide(Resolution::NotFound, "s.example.com", &pages),
            EdgeAction::PassThrough
        );
    }

    #[test]
    fn test_cloak_path_signs_encoded_destination() {
        let pages = signer();
        let path = cloak_path("https://example.com/", &pages);
        let (d, s) = path
            .strip_prefix("/cloak?d=")
            .and_then(|rest| rest.split_once("&s="))
            .unwrap();

        assert_eq!(d, encode_cloak_param("https://example.com/"));
        assert!(pages.verify(SignedPage::Cloak, d, s));
    }

    #[test]
    fn test_is_probe() {
        let empty = HeaderMap::new();
        assert!(is_probe(&Method::HEAD, &empty));
        assert!(!is_probe(&Method::GET, &empty));

        let mut headers = HeaderMap::new();
        headers.insert("sec-purpose", HeaderValue::from_static("prefetch;prerender"));
        assert!(is_probe(&Method::GET, &headers));

        let mut headers = HeaderMap::new();
        headers.insert("purpose", HeaderValue::from_static("prefetch"));
        assert!(is_probe(&Method::GET, &headers));
    }
}
