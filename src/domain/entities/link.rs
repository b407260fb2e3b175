//! Link entity representing a short alias under a domain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The five UTM parameters a link may force onto its destination.
///
/// Stored as a JSON object; unknown keys are ignored and missing keys are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtmParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_campaign: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utm_content: Option<String>,
}

impl UtmParams {
    /// Returns the parameters that are present and non-empty, in a fixed key order.
    pub fn non_empty_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("utm_source", &self.utm_source),
            ("utm_medium", &self.utm_medium),
            ("utm_campaign", &self.utm_campaign),
            ("utm_term", &self.utm_term),
            ("utm_content", &self.utm_content),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (key, v))
        })
        .collect()
    }
}

/// A short link as read by the resolver.
///
/// The same shape is stored in the cache, so every field must survive a
/// serde round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: i64,
    pub url: String,
    pub alias: String,
    pub domain: String,
    pub user_id: Option<i64>,
    pub team_id: Option<i64>,
    pub disabled: bool,
    pub disable_link_after_clicks: Option<i64>,
    pub disable_link_after_date: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
    pub cloaking: bool,
    pub utm_params: Option<UtmParams>,
    pub public_stats: bool,
    pub created_at: DateTime<Utc>,
}

impl Link {
    /// Creates an enabled link with no policies attached.
    pub fn new(
        id: i64,
        alias: String,
        url: String,
        domain: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            url,
            alias,
            domain,
            user_id: None,
            team_id: None,
            disabled: false,
            disable_link_after_clicks: None,
            disable_link_after_date: None,
            password_hash: None,
            cloaking: false,
            utm_params: None,
            public_stats: false,
            created_at,
        }
    }

    pub fn is_password_protected(&self) -> bool {
        self.password_hash.as_deref().is_some_and(|h| !h.is_empty())
    }

    /// Returns true if the link carries a click-count or date expiry policy.
    pub fn has_expiry_policy(&self) -> bool {
        self.disable_link_after_clicks.is_some() || self.disable_link_after_date.is_some()
    }

    /// Returns true if the date-based expiry has been reached at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.disable_link_after_date.is_some_and(|d| now >= d)
    }

    /// Returns true if `recorded_clicks` reaches the click-count limit.
    pub fn is_click_limit_reached(&self, recorded_clicks: i64) -> bool {
        self.disable_link_after_clicks
            .is_some_and(|limit| recorded_clicks >= limit)
    }
}
