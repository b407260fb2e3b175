//! Repository trait for geo rules.

use crate::domain::entities::GeoRule;
use crate::error::AppError;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GeoRuleRepository: Send + Sync {
    /// Lists the rules attached to a link, ordered by `priority` then `id`.
    ///
    /// Rows with an unrecognized type, condition or action are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list_by_link(&self, link_id: i64) -> Result<Vec<GeoRule>, AppError>;
}
