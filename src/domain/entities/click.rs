//! Click analytics records.

/// What caused a click to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// The link's own destination was served.
    Direct,
    /// A geo rule redirected the visitor elsewhere.
    GeoRedirect,
    /// A geo rule blocked the visitor.
    Blocked,
}

impl TriggerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::GeoRedirect => "geo_redirect",
            Self::Blocked => "blocked",
        }
    }
}

/// Input data for appending a click event.
///
/// The raw IP never reaches this struct; only its keyed hash does.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: i64,
    pub ip_hash: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub continent: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub device: Option<String>,
    pub model: Option<String>,
    pub referer: Option<String>,
    pub trigger: TriggerKind,
    pub geo_rule_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_kind_strings() {
        assert_eq!(TriggerKind::Direct.as_str(), "direct");
        assert_eq!(TriggerKind::GeoRedirect.as_str(), "geo_redirect");
        assert_eq!(TriggerKind::Blocked.as_str(), "blocked");
    }
}
