//! Repository trait for click analytics.

use crate::domain::entities::NewClick;
use crate::error::AppError;
use async_trait::async_trait;

/// Append-only access to click events and unique-visit markers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_clicks.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends a click event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors, including a
    /// reference to a link that no longer exists.
    async fn insert_click(&self, click: NewClick) -> Result<i64, AppError>;

    /// Counts every recorded click for a link.
    async fn count_clicks(&self, link_id: i64) -> Result<i64, AppError>;

    /// Records a unique visit unless one already exists for the pair.
    ///
    /// Returns `Ok(true)` if this call created the marker. The check is not
    /// transactional; the unique index absorbs the remaining race.
    async fn record_unique_visit(&self, ip_hash: &str, link_id: i64) -> Result<bool, AppError>;

    /// Counts unique visitors for a link.
    async fn count_unique_visits(&self, link_id: i64) -> Result<i64, AppError>;
}
