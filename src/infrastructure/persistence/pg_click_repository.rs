//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::NewClick;
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for click events and unique visits.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn insert_click(&self, click: NewClick) -> Result<i64, AppError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO link_clicks
                (link_id, ip_hash, country, city, continent, browser, os,
                 device, model, referer, trigger_kind, geo_rule_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(click.link_id)
        .bind(click.ip_hash)
        .bind(click.country)
        .bind(click.city)
        .bind(click.continent)
        .bind(click.browser)
        .bind(click.os)
        .bind(click.device)
        .bind(click.model)
        .bind(click.referer)
        .bind(click.trigger.as_str())
        .bind(click.geo_rule_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks WHERE link_id = $1")
            .bind(link_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn record_unique_visit(&self, ip_hash: &str, link_id: i64) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM unique_visits WHERE ip_hash = $1 AND link_id = $2)",
        )
        .bind(ip_hash)
        .bind(link_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        if exists {
            return Ok(false);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO unique_visits (ip_hash, link_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT unique_visits_ip_link_key DO NOTHING
            "#,
        )
        .bind(ip_hash)
        .bind(link_id)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn count_unique_visits(&self, link_id: i64) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM unique_visits WHERE link_id = $1")
                .bind(link_id)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(count)
    }
}
