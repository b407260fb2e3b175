//! Geo-rule evaluation.
//!
//! Rules are evaluated in a total order: ascending `priority`, then country
//! rules before continent rules on equal priority, then storage order. The
//! first rule whose condition holds wins; there is no "best match" search.

use crate::domain::continents::continent_for_country;
use crate::domain::entities::{GeoRule, RuleAction, RuleCondition, RuleType};
use tracing::warn;

/// What a matched rule asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoOutcome {
    Redirect { destination: String },
    Block { message: Option<String> },
}

/// Result of evaluating a link's rules for one visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoMatch {
    Unmatched,
    Matched { rule_id: i64, outcome: GeoOutcome },
}

/// Evaluates `rules` against the visitor's country code.
///
/// Returns [`GeoMatch::Unmatched`] when there are no rules or the country is
/// unknown. The continent is derived from the country through a static table.
pub fn match_rules(rules: &[GeoRule], country: Option<&str>) -> GeoMatch {
    let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) else {
        return GeoMatch::Unmatched;
    };
    if rules.is_empty() {
        return GeoMatch::Unmatched;
    }

    let country = country.to_ascii_uppercase();
    let continent = continent_for_country(&country);

    let mut ordered: Vec<&GeoRule> = rules.iter().collect();
    ordered.sort_by_key(|r| (r.priority, r.rule_type.specificity_rank()));

    for rule in ordered {
        let subject = match rule.rule_type {
            RuleType::Country => Some(country.as_str()),
            RuleType::Continent => continent,
        };

        let is_member = subject.is_some_and(|code| {
            rule.values
                .iter()
                .any(|v| v.trim().eq_ignore_ascii_case(code))
        });

        let holds = match rule.condition {
            RuleCondition::In => is_member,
            RuleCondition::NotIn => !is_member,
        };
        if !holds {
            continue;
        }

        let outcome = match rule.action {
            RuleAction::Block => GeoOutcome::Block {
                message: rule
                    .block_message
                    .as_deref()
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            },
            RuleAction::Redirect => match rule.destination.as_deref().map(str::trim) {
                Some(destination) if !destination.is_empty() => GeoOutcome::Redirect {
                    destination: destination.to_string(),
                },
                _ => {
                    warn!(rule_id = rule.id, "Redirect rule without destination skipped");
                    continue;
                }
            },
        };

        return GeoMatch::Matched {
            rule_id: rule.id,
            outcome,
        };
    }

    GeoMatch::Unmatched
}
