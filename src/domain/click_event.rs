//! Click job model for asynchronous click recording.

use crate::domain::entities::{Link, NewClick, TriggerKind, VisitorContext};

/// A click waiting to be recorded off the request path.
///
/// Carries the resolved link rather than just its id so the recorder can
/// apply its skip rules (password protection) without another lookup.
#[derive(Debug, Clone)]
pub struct ClickJob {
    pub link: Link,
    pub visitor: VisitorContext,
    pub trigger: TriggerKind,
    pub geo_rule_id: Option<i64>,
    /// HEAD requests and prefetch hints. Never recorded.
    pub probe: bool,
}

impl ClickJob {
    pub fn new(link: Link, visitor: VisitorContext, trigger: TriggerKind) -> Self {
        Self {
            link,
            visitor,
            trigger,
            geo_rule_id: None,
            probe: false,
        }
    }

    pub fn with_geo_rule(mut self, rule_id: Option<i64>) -> Self {
        self.geo_rule_id = rule_id;
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Flattens the job into the row appended to `link_clicks`.
    pub fn to_new_click(&self) -> NewClick {
        let geo = &self.visitor.geo;
        let device = &self.visitor.device;

        NewClick {
            link_id: self.link.id,
            ip_hash: self.visitor.ip_hash.clone(),
            country: geo.country.clone(),
            city: geo.city.clone(),
            continent: geo.continent.clone(),
            browser: device.browser.clone(),
            os: device.os.clone(),
            device: device.device_class.clone(),
            model: device.device_model.clone(),
            referer: self.visitor.referer.clone(),
            trigger: self.trigger,
            geo_rule_id: self.geo_rule_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DeviceInfo, GeoInfo};
    use chrono::Utc;

    fn link() -> Link {
        Link::new(
            42,
            "abc".to_string(),
            "https://example.com".to_string(),
            "s.example.com".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let job = ClickJob::new(link(), VisitorContext::default(), TriggerKind::Direct);

        assert_eq!(job.geo_rule_id, None);
        assert!(!job.probe);
    }

    #[test]
    fn test_to_new_click_copies_visitor_fields() {
        let visitor = VisitorContext {
            geo: GeoInfo::from_raw(Some("de"), Some("Berlin"), None),
            device: DeviceInfo {
                browser: Some("Firefox".to_string()),
                os: Some("Linux".to_string()),
                device_class: Some("desktop".to_string()),
                device_model: None,
                is_bot: false,
            },
            ip_hash: Some("deadbeef".to_string()),
            user_agent: Some("Mozilla/5.0".to_string()),
            referer: Some("https://news.example.org".to_string()),
        };

        let click = ClickJob::new(link(), visitor, TriggerKind::GeoRedirect)
            .with_geo_rule(Some(9))
            .to_new_click();

        assert_eq!(click.link_id, 42);
        assert_eq!(click.country.as_deref(), Some("DE"));
        assert_eq!(click.city.as_deref(), Some("Berlin"));
        assert_eq!(click.browser.as_deref(), Some("Firefox"));
        assert_eq!(click.device.as_deref(), Some("desktop"));
        assert_eq!(click.ip_hash.as_deref(), Some("deadbeef"));
        assert_eq!(click.referer.as_deref(), Some("https://news.example.org"));
        assert_eq!(click.trigger, TriggerKind::GeoRedirect);
        assert_eq!(click.geo_rule_id, Some(9));
    }
}
