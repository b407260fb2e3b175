//! IP geolocation backed by a local MaxMind City database.

use std::net::IpAddr;
use std::path::Path;

use maxminddb::{Reader, geoip2};
use tracing::{info, trace};

use crate::domain::entities::GeoInfo;

#[derive(Debug, thiserror::Error)]
pub enum GeoIpError {
    #[error("Failed to open GeoIP database {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: maxminddb::MaxMindDbError,
    },
}

/// Maps an IP address to a country and city.
///
/// Lookups are synchronous and infallible: anything unknown comes back as
/// an empty [`GeoInfo`].
pub trait GeoLocator: Send + Sync {
    fn locate(&self, ip: IpAddr) -> GeoInfo;

    fn name(&self) -> &'static str;
}

pub struct MaxMindLocator {
    reader: Reader<Vec<u8>>,
}

impl MaxMindLocator {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, GeoIpError> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|source| GeoIpError::Open {
            path: path.display().to_string(),
            source,
        })?;

        info!(path = %path.display(), "GeoIP database loaded");
        Ok(Self { reader })
    }
}

impl GeoLocator for MaxMindLocator {
    fn locate(&self, ip: IpAddr) -> GeoInfo {
        let Ok(result) = self.reader.lookup(ip) else {
            return GeoInfo::default();
        };
        let Ok(Some(city)) = result.decode::<geoip2::City>() else {
            return GeoInfo::default();
        };

        let country = city.country.iso_code;
        let city_name = city.city.names.english;

        trace!(%ip, ?country, ?city_name, "MaxMind lookup");

        GeoInfo::from_raw(country, city_name, None)
    }

    fn name(&self) -> &'static str {
        "maxmind"
    }
}

/// Locator used when no database is configured.
pub struct NoopLocator;

impl GeoLocator for NoopLocator {
    fn locate(&self, _ip: IpAddr) -> GeoInfo {
        GeoInfo::default()
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
