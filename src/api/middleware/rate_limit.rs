//! Per-client rate limiting (token bucket) for the JSON API and the
//! password prompt.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ConnectInfo;
use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{
    GovernorError, GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor,
};

use crate::utils::client_ip::client_ip;

/// Keys the bucket by client IP, honoring proxy headers when the service
/// runs behind a trusted reverse proxy.
///
/// Requests without any address (in-process test transports) share one
/// bucket.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    behind_proxy: bool,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(client_ip(req.headers(), peer, self.behind_proxy)
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
    }
}

type ClientIpGovernor =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

fn governor(behind_proxy: bool, replenish_every: Duration, burst: u32) -> ClientIpGovernor {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(ClientIpKeyExtractor { behind_proxy })
            .period(replenish_every)
            .burst_size(burst)
            .finish()
            .expect("rate limit settings are non-zero"),
    );

    GovernorLayer::new(governor_conf)
}

/// Creates the rate limiter for `/api`.
///
/// # Limits
///
/// - **Rate**: 20 requests per second (one token every 50ms)
/// - **Burst**: 200 requests
///
/// Requests exceeding the limit receive `429 Too Many Requests`.
///
/// # Example
///
/// ```rust,ignore
/// let api = Router::new()
///     .route("/resolve", get(resolve_handler))
///     .layer(rate_limit::layer(config.behind_proxy));
/// ```
pub fn layer(behind_proxy: bool) -> ClientIpGovernor {
    governor(behind_proxy, Duration::from_millis(50), 200)
}

/// Creates the rate limiter for the password prompt.
///
/// Every submission runs an Argon2 verification, so the budget is small:
/// a burst of 5 attempts, then one every 6 seconds.
pub fn password_layer(behind_proxy: bool) -> ClientIpGovernor {
    governor(behind_proxy, Duration::from_secs(6), 5)
}
