//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};
use std::sync::Arc;

use crate::domain::entities::{Link, UtmParams};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

const LINK_COLUMNS: &str = r#"
    id, url, alias, domain, user_id, team_id, disabled,
    disable_link_after_clicks, disable_link_after_date,
    password_hash, cloaking, utm_params, public_stats, created_at
"#;

#[derive(FromRow)]
struct LinkRow {
    id: i64,
    url: String,
    alias: String,
    domain: String,
    user_id: Option<i64>,
    team_id: Option<i64>,
    disabled: bool,
    disable_link_after_clicks: Option<i64>,
    disable_link_after_date: Option<DateTime<Utc>>,
    password_hash: Option<String>,
    cloaking: bool,
    utm_params: Option<Json<UtmParams>>,
    public_stats: bool,
    created_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            url: r.url,
            alias: r.alias,
            domain: r.domain,
            user_id: r.user_id,
            team_id: r.team_id,
            disabled: r.disabled,
            disable_link_after_clicks: r.disable_link_after_clicks,
            disable_link_after_date: r.disable_link_after_date,
            password_hash: r.password_hash,
            cloaking: r.cloaking,
            utm_params: r.utm_params.map(|Json(p)| p),
            public_stats: r.public_stats,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository for link retrieval.
///
/// Uses bound parameters only; the alias match relies on the
/// `(domain, LOWER(alias))` unique index.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_domain_and_alias(
        &self,
        domain: &str,
        alias: &str,
    ) -> Result<Option<Link>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE domain = $1 AND LOWER(alias) = LOWER($2) LIMIT 1"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(domain)
            .bind(alias)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn disable(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE links SET disabled = TRUE WHERE id = $1 AND disabled = FALSE")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
