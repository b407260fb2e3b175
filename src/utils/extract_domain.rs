//! Domain extraction from HTTP request headers and domain normalization.

use crate::AppError;
use axum::http::{HeaderMap, header};

/// Extracts the domain name from HTTP request headers.
///
/// Parses the `Host` header, handling:
/// - IPv4 addresses (e.g., `192.168.1.1`)
/// - IPv6 addresses (e.g., `[::1]`)
/// - Hostnames with ports (e.g., `example.com:3000`)
/// - Plain hostnames (e.g., `example.com`)
///
/// Port numbers are stripped from the result.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if:
/// - The `Host` header is missing
/// - The header value contains invalid UTF-8
pub fn extract_domain_from_headers(headers: &HeaderMap) -> Result<String, AppError> {
    let host = headers
        .get(header::HOST)
        .ok_or_else(|| AppError::bad_request("Missing Host header", serde_json::json!({})))?
        .to_str()
        .map_err(|_| AppError::bad_request("Invalid Host header", serde_json::json!({})))?;

    Ok(strip_port(host).to_string())
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        // IPv6 address (e.g., [::1] or [::1]:8080)
        match host.find(']') {
            Some(end_bracket) => &host[..=end_bracket],
            None => host,
        }
    } else {
        host.split(':').next().unwrap_or(host)
    }
}

/// Normalizes a domain as received from a client into its stored form.
///
/// Strips any scheme, path, port and leading `www.`, and lowercases the
/// rest. Development hosts containing `localhost` map to `default_domain`.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_domain("HTTPS://www.S.Example.com:443/x", "d.io"), "s.example.com");
/// assert_eq!(normalize_domain("localhost:3000", "d.io"), "d.io");
/// ```
pub fn normalize_domain(raw: &str, default_domain: &str) -> String {
    let trimmed = raw.trim();
    let without_scheme = trimmed
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(trimmed);
    let host = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_scheme);
    let host = strip_port(host).to_ascii_lowercase();

    if host.contains("localhost") {
        return default_domain.to_ascii_lowercase();
    }

    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}
