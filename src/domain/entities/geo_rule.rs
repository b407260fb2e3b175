//! Geo-targeting rule attached to a link.

use serde::{Deserialize, Serialize};

/// What a rule's `values` are matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Country,
    Continent,
}

/// Whether the visitor must be inside or outside the value set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCondition {
    In,
    NotIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Redirect,
    Block,
}

impl RuleType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "country" => Some(Self::Country),
            "continent" => Some(Self::Continent),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::Continent => "continent",
        }
    }

    /// Tie-break rank for rules of equal priority: country rules go first.
    pub fn specificity_rank(self) -> u8 {
        match self {
            Self::Country => 0,
            Self::Continent => 1,
        }
    }
}

impl RuleCondition {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in" => Some(Self::In),
            "not_in" => Some(Self::NotIn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::NotIn => "not_in",
        }
    }
}

impl RuleAction {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "redirect" => Some(Self::Redirect),
            "block" => Some(Self::Block),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Block => "block",
        }
    }
}

/// A single geo rule. Lower `priority` is evaluated first.
///
/// `destination` is required when `action` is [`RuleAction::Redirect`];
/// `block_message` only applies to [`RuleAction::Block`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRule {
    pub id: i64,
    pub link_id: i64,
    pub rule_type: RuleType,
    pub condition: RuleCondition,
    pub values: Vec<String>,
    pub action: RuleAction,
    pub destination: Option<String>,
    pub block_message: Option<String>,
    pub priority: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_string_forms_round_trip() {
        for t in [RuleType::Country, RuleType::Continent] {
            assert_eq!(RuleType::parse(t.as_str()), Some(t));
        }
        for c in [RuleCondition::In, RuleCondition::NotIn] {
            assert_eq!(RuleCondition::parse(c.as_str()), Some(c));
        }
        for a in [RuleAction::Redirect, RuleAction::Block] {
            assert_eq!(RuleAction::parse(a.as_str()), Some(a));
        }
    }

    #[test]
    fn test_unknown_strings_are_rejected() {
        assert!(RuleType::parse("region").is_none());
        assert!(RuleCondition::parse("IN").is_none());
        assert!(RuleAction::parse("allow").is_none());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&RuleCondition::NotIn).unwrap();
        assert_eq!(json, "\"not_in\"");
    }

    #[test]
    fn test_country_ranks_before_continent() {
        assert!(RuleType::Country.specificity_rank() < RuleType::Continent.specificity_rank());
    }
}
