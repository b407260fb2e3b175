mod common;

use chrono::Utc;
use link_edge::application::services::{ClickRecorder, RecordOutcome};
use link_edge::domain::click_event::ClickJob;
use link_edge::domain::entities::{Link, TriggerKind, VisitorContext};
use link_edge::domain::repositories::ClickRepository;
use link_edge::infrastructure::persistence::PgClickRepository;
use sqlx::PgPool;
use std::sync::Arc;

fn job_for(link_id: i64, ip_hash: &str) -> ClickJob {
    let link = Link::new(
        link_id,
        "abc".to_string(),
        "https://example.com".to_string(),
        common::TEST_DOMAIN.to_string(),
        Utc::now(),
    );
    let mut visitor = VisitorContext {
        ip_hash: Some(ip_hash.to_string()),
        referer: Some("https://news.example.org/".to_string()),
        ..Default::default()
    };
    visitor.geo.country = Some("DE".to_string());
    visitor.geo.continent = Some("EU".to_string());
    visitor.device.browser = Some("Firefox".to_string());

    ClickJob::new(link, visitor, TriggerKind::Direct)
}

#[sqlx::test]
async fn test_insert_click_persists_fields(pool: PgPool) {
    let link_id = common::create_test_link(&pool, common::TEST_DOMAIN, "abc", "https://example.com").await;
    let repo = PgClickRepository::new(Arc::new(pool.clone()));

    let click = job_for(link_id, "hash-a").with_geo_rule(None).to_new_click();
    let id = repo.insert_click(click).await.unwrap();

    let (country, trigger, referer): (Option<String>, String, Option<String>) = sqlx::query_as(
        "SELECT country, trigger_kind, referer FROM link_clicks WHERE id = $1",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_eq!(country.as_deref(), Some("DE"));
    assert_eq!(trigger, "direct");
    assert_eq!(referer.as_deref(), Some("https://news.example.org/"));
    assert_eq!(repo.count_clicks(link_id).await.unwrap(), 1);
}

#[sqlx::test]
async fn test_unique_visit_recorded_once(pool: PgPool) {
    let link_id = common::create_test_link(&pool, common::TEST_DOMAIN, "abc", "https://example.com").await;
    let repo = PgClickRepository::new(Arc::new(pool));

    assert!(repo.record_unique_visit("hash-a", link_id).await.unwrap());
    assert!(!repo.record_unique_visit("hash-a", link_id).await.unwrap());
    assert!(repo.record_unique_visit("hash-b", link_id).await.unwrap());

    assert_eq!(repo.count_unique_visits(link_id).await.unwrap(), 2);
}

#[sqlx::test]
async fn test_recorder_same_visitor_twice(pool: PgPool) {
    let link_id = common::create_test_link(&pool, common::TEST_DOMAIN, "abc", "https://example.com").await;
    let repo = Arc::new(PgClickRepository::new(Arc::new(pool)));
    let recorder = ClickRecorder::new(repo.clone());

    let first = recorder.record(&job_for(link_id, "hash-a")).await.unwrap();
    let second = recorder.record(&job_for(link_id, "hash-a")).await.unwrap();

    assert_eq!(first, RecordOutcome::Recorded { unique: true });
    assert_eq!(second, RecordOutcome::Recorded { unique: false });
    assert_eq!(repo.count_clicks(link_id).await.unwrap(), 2);
    assert_eq!(repo.count_unique_visits(link_id).await.unwrap(), 1);
}

#[sqlx::test]
async fn test_recorder_skips_password_protected_links(pool: PgPool) {
    let link_id = common::create_test_link(&pool, common::TEST_DOMAIN, "abc", "https://example.com").await;
    let repo = Arc::new(PgClickRepository::new(Arc::new(pool)));
    let recorder = ClickRecorder::new(repo.clone());

    let mut job = job_for(link_id, "hash-a");
    job.link.password_hash = Some("$argon2id$v=19$stub".to_string());

    assert!(matches!(
        recorder.record(&job).await.unwrap(),
        RecordOutcome::Skipped(_)
    ));
    assert_eq!(repo.count_clicks(link_id).await.unwrap(), 0);
    assert_eq!(repo.count_unique_visits(link_id).await.unwrap(), 0);
}
