//! Builds a [`VisitorContext`] from raw request metadata.

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::HeaderMap;

use crate::domain::continents::continent_for_country;
use crate::domain::entities::{GeoInfo, VisitorContext};
use crate::infrastructure::geoip::GeoLocator;
use crate::utils::ip_hash::IpHasher;
use crate::utils::user_agent::parse_user_agent;

/// Geo values supplied by a trusted edge or by an API caller.
#[derive(Debug, Clone, Default)]
pub struct GeoHints {
    pub country: Option<String>,
    pub city: Option<String>,
    pub continent: Option<String>,
}

impl GeoHints {
    /// Reads Cloudflare and Vercel geolocation headers.
    ///
    /// Clients can set these headers themselves, so they are only read
    /// when a trusted proxy sits in front of the service; otherwise no
    /// hints are returned and the IP database decides.
    pub fn from_headers(headers: &HeaderMap, behind_proxy: bool) -> Self {
        if !behind_proxy {
            return Self::default();
        }

        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        Self {
            country: header("cf-ipcountry").or_else(|| header("x-vercel-ip-country")),
            city: header("x-vercel-ip-city"),
            continent: None,
        }
    }
}

/// Raw request metadata for [`VisitorService::inspect`].
#[derive(Debug, Clone, Default)]
pub struct VisitorRequest<'a> {
    pub ip: Option<IpAddr>,
    pub user_agent: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub hints: GeoHints,
}

/// Derives geo, device and IP-hash information for a visitor.
///
/// Hints win over the IP database; the continent is always derivable from
/// a known country.
pub struct VisitorService {
    locator: Arc<dyn GeoLocator>,
    hasher: IpHasher,
}

impl VisitorService {
    pub fn new(locator: Arc<dyn GeoLocator>, hasher: IpHasher) -> Self {
        Self { locator, hasher }
    }

    pub fn inspect(&self, request: VisitorRequest<'_>) -> VisitorContext {
        let hints = &request.hints;
        let mut geo = GeoInfo::from_raw(
            hints.country.as_deref(),
            hints.city.as_deref(),
            hints.continent.as_deref(),
        );

        if geo.country.is_none()
            && let Some(ip) = request.ip
        {
            let located = self.locator.locate(ip);
            geo.country = located.country;
            geo.city = geo.city.or(located.city);
        }

        if geo.continent.is_none() {
            geo.continent = geo
                .country
                .as_deref()
                .and_then(continent_for_country)
                .map(str::to_string);
        }

        let clean = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        VisitorContext {
            geo,
            device: parse_user_agent(request.user_agent),
            ip_hash: request.ip.map(|ip| self.hasher.hash(ip)),
            user_agent: clean(request.user_agent),
            referer: clean(request.referer),
        }
    }
}
