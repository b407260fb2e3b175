//! Per-request visitor description. Never persisted as-is.

/// Placeholder strings upstream layers use for "no geo data".
const GEO_SENTINELS: &[&str] = &["unknown", "undefined", "null", "-", "xx"];

/// Normalizes a raw geo value from headers or query strings.
///
/// Returns `None` for empty strings and the sentinels `"Unknown"`,
/// `"undefined"`, `"null"` (any case), so the core only ever sees real values.
pub fn normalize_geo_value(raw: Option<&str>) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() || GEO_SENTINELS.iter().any(|s| value.eq_ignore_ascii_case(s)) {
        return None;
    }
    Some(value.to_string())
}

/// Geographic location of a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoInfo {
    /// ISO 3166-1 alpha-2, upper-case.
    pub country: Option<String>,
    pub city: Option<String>,
    /// Two-letter continent code (`EU`, `NA`, ...).
    pub continent: Option<String>,
}

impl GeoInfo {
    /// Builds geo info from raw strings, dropping sentinels and upper-casing codes.
    pub fn from_raw(country: Option<&str>, city: Option<&str>, continent: Option<&str>) -> Self {
        Self {
            country: normalize_geo_value(country).map(|c| c.to_ascii_uppercase()),
            city: normalize_geo_value(city),
            continent: normalize_geo_value(continent).map(|c| c.to_ascii_uppercase()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.country.is_none() && self.city.is_none() && self.continent.is_none()
    }
}

/// Device information inferred from the user agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub browser: Option<String>,
    pub os: Option<String>,
    /// `desktop`, `mobile`, `tablet`, or the parser's raw category.
    pub device_class: Option<String>,
    pub device_model: Option<String>,
    pub is_bot: bool,
}

/// Everything the resolver and the click recorder know about a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub geo: GeoInfo,
    pub device: DeviceInfo,
    /// Keyed one-way hash of the client IP.
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_become_none() {
        for raw in ["", "  ", "Unknown", "undefined", "null", "NULL"] {
            assert_eq!(normalize_geo_value(Some(raw)), None, "raw = {raw:?}");
        }
        assert_eq!(normalize_geo_value(None), None);
    }

    #[test]
    fn test_real_values_are_kept() {
        assert_eq!(normalize_geo_value(Some(" Berlin ")), Some("Berlin".to_string()));
    }

    #[test]
    fn test_from_raw_uppercases_codes() {
        let geo = GeoInfo::from_raw(Some("de"), Some("Berlin"), Some("eu"));

        assert_eq!(geo.country.as_deref(), Some("DE"));
        assert_eq!(geo.city.as_deref(), Some("Berlin"));
        assert_eq!(geo.continent.as_deref(), Some("EU"));
    }

    #[test]
    fn test_from_raw_all_unknown() {
        let geo = GeoInfo::from_raw(Some("Unknown"), Some("undefined"), Some("null"));
        assert!(geo.is_empty());
    }
}
