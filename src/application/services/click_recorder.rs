//! Persists click events and unique-visit markers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_retry::Retry;
use tracing::debug;

use crate::domain::click_event::ClickJob;
use crate::domain::click_worker::{ClickSink, write_retry_strategy};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;
use crate::utils::user_agent::is_bot;

/// Why a click job was not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PasswordProtected,
    Probe,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// `unique` is true when this click created the visitor's first marker.
    Recorded { unique: bool },
    Skipped(SkipReason),
}

/// Records clicks drained from the click queue.
///
/// Skips password-protected links, probes and bots. Otherwise the click
/// insert and the unique-visit check run concurrently, each with its own
/// retries, so a failing unique-visit write never duplicates the click.
pub struct ClickRecorder<C: ClickRepository> {
    clicks: Arc<C>,
}

impl<C: ClickRepository> ClickRecorder<C> {
    pub fn new(clicks: Arc<C>) -> Self {
        Self { clicks }
    }

    fn skip_reason(job: &ClickJob) -> Option<SkipReason> {
        if job.link.is_password_protected() {
            return Some(SkipReason::PasswordProtected);
        }
        if job.probe {
            return Some(SkipReason::Probe);
        }
        if job.visitor.device.is_bot || job.visitor.user_agent.as_deref().is_some_and(is_bot) {
            return Some(SkipReason::Bot);
        }
        None
    }

    /// Records one click.
    ///
    /// # Errors
    ///
    /// Returns the repository error of a write that still fails after its
    /// retries. The other write is not rolled back.
    pub async fn record(&self, job: &ClickJob) -> Result<RecordOutcome, AppError> {
        if let Some(reason) = Self::skip_reason(job) {
            return Ok(RecordOutcome::Skipped(reason));
        }

        let insert = Retry::start(write_retry_strategy(), || {
            self.clicks.insert_click(job.to_new_click())
        });
        let unique = async {
            match job.visitor.ip_hash.as_deref() {
                Some(ip_hash) => {
                    Retry::start(write_retry_strategy(), || {
                        self.clicks.record_unique_visit(ip_hash, job.link.id)
                    })
                    .await
                }
                None => Ok(false),
            }
        };

        let (inserted, unique) = tokio::join!(insert, unique);
        inserted?;

        Ok(RecordOutcome::Recorded { unique: unique? })
    }
}

#[async_trait]
impl<C: ClickRepository + 'static> ClickSink for ClickRecorder<C> {
    async fn record(&self, job: &ClickJob) -> Result<(), AppError> {
        let outcome = Self::record(self, job).await?;
        debug!(link_id = job.link.id, ?outcome, "Click processed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Link, TriggerKind, VisitorContext};
    use crate::domain::click_worker::{ClickQueue, run_click_worker};
    use crate::domain::repositories::MockClickRepository;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn job() -> ClickJob {
        let link = Link::new(
            3,
            "abc".to_string(),
            "https://example.com".to_string(),
            "s.example.com".to_string(),
            Utc::now(),
        );
        let visitor = VisitorContext {
            ip_hash: Some("hash-1".to_string()),
            user_agent: Some("Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0".to_string()),
            ..Default::default()
        };
        ClickJob::new(link, visitor, TriggerKind::Direct)
    }

    #[tokio::test]
    async fn test_records_click_and_unique_visit() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_insert_click()
            .withf(|c| c.link_id == 3 && c.trigger == TriggerKind::Direct)
            .times(1)
            .returning(|_| Ok(1));
        clicks
            .expect_record_unique_visit()
            .withf(|hash, link_id| hash == "hash-1" && *link_id == 3)
            .times(1)
            .returning(|_, _| Ok(true));

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert_eq!(
            recorder.record(&job()).await.unwrap(),
            RecordOutcome::Recorded { unique: true }
        );
    }

    #[tokio::test]
    async fn test_repeat_visitor_is_not_unique() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_insert_click().times(1).returning(|_| Ok(2));
        clicks
            .expect_record_unique_visit()
            .times(1)
            .returning(|_, _| Ok(false));

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert_eq!(
            recorder.record(&job()).await.unwrap(),
            RecordOutcome::Recorded { unique: false }
        );
    }

    #[tokio::test]
    async fn test_missing_ip_hash_skips_unique_tracking() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_insert_click().times(1).returning(|_| Ok(1));
        clicks.expect_record_unique_visit().never();

        let mut job = job();
        job.visitor.ip_hash = None;

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert_eq!(
            recorder.record(&job).await.unwrap(),
            RecordOutcome::Recorded { unique: false }
        );
    }

    #[tokio::test]
    async fn test_skips_password_protected_probe_and_bot() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_insert_click().never();
        clicks.expect_record_unique_visit().never();
        let recorder = ClickRecorder::new(Arc::new(clicks));

        let mut protected = job();
        protected.link.password_hash = Some("$argon2id$x".to_string());
        assert_eq!(
            recorder.record(&protected).await.unwrap(),
            RecordOutcome::Skipped(SkipReason::PasswordProtected)
        );

        let probe = job().with_probe(true);
        assert_eq!(
            recorder.record(&probe).await.unwrap(),
            RecordOutcome::Skipped(SkipReason::Probe)
        );

        let mut bot = job();
        bot.visitor.user_agent = Some("Slackbot-LinkExpanding 1.0".to_string());
        assert_eq!(
            recorder.record(&bot).await.unwrap(),
            RecordOutcome::Skipped(SkipReason::Bot)
        );
    }

    #[tokio::test]
    async fn test_insert_error_propagates() {
        let mut clicks = MockClickRepository::new();
        clicks
            .expect_insert_click()
            .returning(|_| Err(AppError::internal("Database error", json!({}))));
        clicks
            .expect_record_unique_visit()
            .returning(|_, _| Ok(true));

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert!(recorder.record(&job()).await.is_err());
    }

    /// Unique-visit mock that fails on its first call only.
    fn flaky_unique_visits(clicks: &mut MockClickRepository) {
        let failed = AtomicBool::new(false);
        clicks
            .expect_record_unique_visit()
            .times(2)
            .returning(move |_, _| {
                if failed.swap(true, Ordering::SeqCst) {
                    Ok(true)
                } else {
                    Err(AppError::internal("Database error", json!({})))
                }
            });
    }

    #[tokio::test]
    async fn test_unique_visit_retry_does_not_duplicate_click() {
        let mut clicks = MockClickRepository::new();
        clicks.expect_insert_click().times(1).returning(|_| Ok(1));
        flaky_unique_visits(&mut clicks);

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert_eq!(
            recorder.record(&job()).await.unwrap(),
            RecordOutcome::Recorded { unique: true }
        );
    }

    #[tokio::test]
    async fn test_insert_is_retried_alone() {
        let mut clicks = MockClickRepository::new();
        let failed = AtomicBool::new(false);
        clicks
            .expect_insert_click()
            .times(2)
            .returning(move |_| {
                if failed.swap(true, Ordering::SeqCst) {
                    Ok(7)
                } else {
                    Err(AppError::internal("Database error", json!({})))
                }
            });
        clicks
            .expect_record_unique_visit()
            .times(1)
            .returning(|_, _| Ok(false));

        let recorder = ClickRecorder::new(Arc::new(clicks));

        assert_eq!(
            recorder.record(&job()).await.unwrap(),
            RecordOutcome::Recorded { unique: false }
        );
    }

    #[tokio::test]
    async fn test_worker_records_one_click_per_visit_despite_failures() {
        let inserts = Arc::new(AtomicUsize::new(0));
        let mut clicks = MockClickRepository::new();
        let counter = inserts.clone();
        clicks.expect_insert_click().returning(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        });
        flaky_unique_visits(&mut clicks);

        let (tx, rx) = mpsc::channel::<ClickJob>(4);
        assert!(tx.enqueue(job()));
        drop(tx);

        let recorder = Arc::new(ClickRecorder::new(Arc::new(clicks)));
        run_click_worker(rx, recorder, 1).await;

        assert_eq!(inserts.load(Ordering::SeqCst), 1);
    }
}
