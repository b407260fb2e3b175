//! Click queue and the background worker that drains it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Semaphore, mpsc, mpsc::error::TrySendError};
use tokio::task::JoinSet;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickJob;
use crate::error::AppError;

/// Hands click jobs to the background recorder.
///
/// `enqueue` never blocks the caller; when the queue is full the job is
/// dropped and `false` is returned.
#[cfg_attr(test, mockall::automock)]
pub trait ClickQueue: Send + Sync {
    fn enqueue(&self, job: ClickJob) -> bool;
}

impl ClickQueue for mpsc::Sender<ClickJob> {
    fn enqueue(&self, job: ClickJob) -> bool {
        match self.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                warn!(link_id = job.link.id, "Click queue full, dropping click");
                metrics::counter!("clicks_dropped_total", "reason" => "queue_full").increment(1);
                false
            }
            Err(TrySendError::Closed(job)) => {
                warn!(link_id = job.link.id, "Click queue closed, dropping click");
                metrics::counter!("clicks_dropped_total", "reason" => "queue_closed").increment(1);
                false
            }
        }
    }
}

/// Destination of drained click jobs.
///
/// `record` is called once per job. A job is made of several writes, so
/// retrying belongs to the sink: it retries each write on its own and
/// never repeats one that already succeeded.
#[async_trait]
pub trait ClickSink: Send + Sync + 'static {
    async fn record(&self, job: &ClickJob) -> Result<(), AppError>;
}

/// Backoff for a single click write: three retries, 10ms, 20ms and 40ms
/// before jitter.
pub fn write_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(2)
        .factor(5)
        .map(jitter)
        .take(3)
}

/// Drains `rx` until every sender is dropped, running at most
/// `concurrency` recordings at once.
///
/// A job the sink fails to record is logged and discarded. Jobs already in
/// flight when the channel closes are awaited before returning.
pub async fn run_click_worker<S: ClickSink>(
    mut rx: mpsc::Receiver<ClickJob>,
    sink: Arc<S>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    info!(concurrency, "Click worker started");

    while let Some(job) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let sink = sink.clone();

        in_flight.spawn(async move {
            let _permit = permit;
            record_job(sink.as_ref(), job).await;
        });

        while in_flight.try_join_next().is_some() {}
    }

    let pending = in_flight.len();
    if pending > 0 {
        debug!(pending, "Waiting for in-flight clicks");
    }
    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

async fn record_job<S: ClickSink + ?Sized>(sink: &S, job: ClickJob) {
    match sink.record(&job).await {
        Ok(()) => {
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Err(e) => {
            warn!(link_id = job.link.id, error = %e, "Failed to record click");
            metrics::counter!("clicks_failed_total").increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Link, TriggerKind, VisitorContext};
    use chrono::Utc;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn job(id: i64) -> ClickJob {
        let link = Link::new(
            id,
            format!("a{id}"),
            "https://example.com".to_string(),
            "s.example.com".to_string(),
            Utc::now(),
        );
        ClickJob::new(link, VisitorContext::default(), TriggerKind::Direct)
    }

    #[derive(Default)]
    struct CountingSink {
        calls: AtomicUsize,
        fail_first: usize,
    }

    #[async_trait]
    impl ClickSink for CountingSink {
        async fn record(&self, _job: &ClickJob) -> Result<(), AppError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                Err(AppError::internal("Database error", json!({})))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_enqueue_returns_false_when_full() {
        let (tx, _rx) = mpsc::channel::<ClickJob>(1);

        assert!(tx.enqueue(job(1)));
        assert!(!tx.enqueue(job(2)));
    }

    #[tokio::test]
    async fn test_enqueue_returns_false_when_closed() {
        let (tx, rx) = mpsc::channel::<ClickJob>(4);
        drop(rx);

        assert!(!tx.enqueue(job(1)));
    }

    #[tokio::test]
    async fn test_worker_drains_queue_on_close() {
        let (tx, rx) = mpsc::channel::<ClickJob>(16);
        let sink = Arc::new(CountingSink::default());

        for id in 0..5 {
            assert!(tx.enqueue(job(id)));
        }
        drop(tx);

        run_click_worker(rx, sink.clone(), 2).await;

        assert_eq!(sink.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_worker_discards_failed_job_and_continues() {
        let (tx, rx) = mpsc::channel::<ClickJob>(4);
        let sink = Arc::new(CountingSink {
            calls: AtomicUsize::new(0),
            fail_first: 1,
        });

        assert!(tx.enqueue(job(1)));
        assert!(tx.enqueue(job(2)));
        drop(tx);

        run_click_worker(rx, sink.clone(), 1).await;

        // The worker itself never replays a job.
        assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_write_retry_strategy_is_bounded() {
        let delays: Vec<Duration> = write_retry_strategy().collect();

        assert_eq!(delays.len(), 3);
        assert!(delays.iter().all(|d| *d <= Duration::from_millis(40)));
    }
}
