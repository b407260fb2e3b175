//! PostgreSQL implementation of geo-rule repository.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{GeoRule, RuleAction, RuleCondition, RuleType};
use crate::domain::repositories::GeoRuleRepository;
use crate::error::AppError;

#[derive(FromRow)]
struct GeoRuleRow {
    id: i64,
    link_id: i64,
    rule_type: String,
    rule_condition: String,
    codes: Vec<String>,
    action: String,
    destination: Option<String>,
    block_message: Option<String>,
    priority: i32,
}

impl GeoRuleRow {
    fn into_rule(self) -> Option<GeoRule> {
        let (Some(rule_type), Some(condition), Some(action)) = (
            RuleType::parse(&self.rule_type),
            RuleCondition::parse(&self.rule_condition),
            RuleAction::parse(&self.action),
        ) else {
            warn!(rule_id = self.id, "Skipping geo rule with unknown type, condition or action");
            return None;
        };

        Some(GeoRule {
            id: self.id,
            link_id: self.link_id,
            rule_type,
            condition,
            values: self.codes,
            action,
            destination: self.destination,
            block_message: self.block_message,
            priority: self.priority,
        })
    }
}

pub struct PgGeoRuleRepository {
    pool: Arc<PgPool>,
}

impl PgGeoRuleRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GeoRuleRepository for PgGeoRuleRepository {
    async fn list_by_link(&self, link_id: i64) -> Result<Vec<GeoRule>, AppError> {
        let rows = sqlx::query_as::<_, GeoRuleRow>(
            r#"
            SELECT id, link_id, rule_type, rule_condition, codes, action,
                   destination, block_message, priority
            FROM geo_rules
            WHERE link_id = $1
            ORDER BY priority ASC, id ASC
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().filter_map(GeoRuleRow::into_rule).collect())
    }
}
