//! Client IP extraction.

use std::net::IpAddr;

use axum::http::HeaderMap;

/// Forwarding headers consulted, most trusted first.
const FORWARDED_HEADERS: &[&str] = &["cf-connecting-ip", "x-real-ip", "x-forwarded-for"];

/// Returns the visitor's IP address.
///
/// Behind a proxy the forwarding headers win over the socket peer; for
/// `X-Forwarded-For` the left-most entry is the client. Without a proxy the
/// headers are attacker-controlled and ignored.
pub fn client_ip(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> Option<IpAddr> {
    if behind_proxy {
        for name in FORWARDED_HEADERS {
            let parsed = headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .and_then(|v| v.trim().parse::<IpAddr>().ok());

            if parsed.is_some() {
                return parsed;
            }
        }
    }

    peer
}
