//! Destination URL validation and the opaque cloak parameter.
//!
//! Only `http` and `https` destinations are ever redirected to or framed.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use url::{ParseError, Url};

/// Errors returned when a destination cannot be served.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlSafetyError {
    #[error("Destination URL is empty")]
    Empty,

    #[error("Only HTTP and HTTPS protocols are allowed, got {0:?}")]
    UnsupportedScheme(String),

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Cloak parameter is not valid base64url")]
    InvalidEncoding,
}

/// Validates a destination and returns it parsed.
///
/// A value without a scheme (`example.com/page`) is retried once with an
/// `https://` prefix. `host:port` values parse as a bogus scheme containing
/// a dot and get the same retry.
///
/// # Errors
///
/// - [`UrlSafetyError::Empty`] for blank input
/// - [`UrlSafetyError::UnsupportedScheme`] for `javascript:`, `data:`, `ftp:` and friends
/// - [`UrlSafetyError::InvalidFormat`] if neither attempt parses
pub fn validate_destination(raw: &str) -> Result<Url, UrlSafetyError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlSafetyError::Empty);
    }

    match Url::parse(raw) {
        Ok(url) if is_web_scheme(&url) => Ok(url),
        Ok(url) if url.scheme().contains('.') => with_https_prefix(raw),
        Ok(url) => Err(UrlSafetyError::UnsupportedScheme(url.scheme().to_string())),
        Err(ParseError::RelativeUrlWithoutBase) => with_https_prefix(raw),
        Err(e) => Err(UrlSafetyError::InvalidFormat(e.to_string())),
    }
}

fn with_https_prefix(raw: &str) -> Result<Url, UrlSafetyError> {
    let url = Url::parse(&format!("https://{raw}"))
        .map_err(|e| UrlSafetyError::InvalidFormat(e.to_string()))?;

    if url.host_str().is_none_or(|h| h.is_empty()) {
        return Err(UrlSafetyError::InvalidFormat("missing host".to_string()));
    }
    Ok(url)
}

fn is_web_scheme(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Returns false when framing `destination` from `request_domain` would
/// load this service inside its own frame.
pub fn can_cloak(destination: &Url, request_domain: &str) -> bool {
    let Some(host) = destination.host_str() else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);
    let request = request_domain.strip_prefix("www.").unwrap_or(request_domain);

    !host.eq_ignore_ascii_case(request)
}

/// Encodes a destination for the cloak page query string.
pub fn encode_cloak_param(destination: &str) -> String {
    URL_SAFE_NO_PAD.encode(destination.as_bytes())
}

/// Decodes and re-validates a cloak parameter.
///
/// # Errors
///
/// [`UrlSafetyError::InvalidEncoding`] for malformed base64 or non-UTF-8
/// payloads, otherwise whatever [`validate_destination`] reports.
pub fn decode_cloak_param(param: &str) -> Result<Url, UrlSafetyError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(param.trim())
        .map_err(|_| UrlSafetyError::InvalidEncoding)?;
    let raw = String::from_utf8(bytes).map_err(|_| UrlSafetyError::InvalidEncoding)?;

    validate_destination(&raw)
}
