#![allow(dead_code)]

use axum::extract::ConnectInfo;
use link_edge::application::services::VisitorService;
use link_edge::domain::click_event::ClickJob;
use link_edge::domain::entities::GeoInfo;
use link_edge::infrastructure::cache::NullCache;
use link_edge::infrastructure::geoip::{GeoLocator, NoopLocator};
use link_edge::state::AppState;
use link_edge::utils::ip_hash::IpHasher;
use link_edge::utils::page_signer::PageSigner;
use sqlx::PgPool;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

pub const TEST_DOMAIN: &str = "s.example.com";
pub const TEST_SECRET: &str = "test-secret";

pub async fn create_test_link(pool: &PgPool, domain: &str, alias: &str, url: &str) -> i64 {
    sqlx::query_scalar("INSERT INTO links (domain, alias, url) VALUES ($1, $2, $3) RETURNING id")
        .bind(domain)
        .bind(alias)
        .bind(url)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn set_link_column(pool: &PgPool, link_id: i64, assignment: &str) {
    sqlx::query(&format!("UPDATE links SET {assignment} WHERE id = $1"))
        .bind(link_id)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn set_password_hash(pool: &PgPool, link_id: i64, hash: &str) {
    sqlx::query("UPDATE links SET password_hash = $2 WHERE id = $1")
        .bind(link_id)
        .bind(hash)
        .execute(pool)
        .await
        .unwrap();
}

pub async fn set_utm(pool: &PgPool, link_id: i64, utm: serde_json::Value) {
    sqlx::query("UPDATE links SET utm_params = $2 WHERE id = $1")
        .bind(link_id)
        .bind(utm)
        .execute(pool)
        .await
        .unwrap();
}

#[allow(clippy::too_many_arguments)]
pub async fn create_geo_rule(
    pool: &PgPool,
    link_id: i64,
    rule_type: &str,
    condition: &str,
    codes: &[&str],
    action: &str,
    destination: Option<&str>,
    priority: i32,
) -> i64 {
    let codes: Vec<String> = codes.iter().map(|c| c.to_string()).collect();

    sqlx::query_scalar(
        "INSERT INTO geo_rules (link_id, rule_type, rule_condition, codes, action, destination, priority) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(link_id)
    .bind(rule_type)
    .bind(condition)
    .bind(codes)
    .bind(action)
    .bind(destination)
    .bind(priority)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_test_clicks(pool: &PgPool, link_id: i64, count: usize) {
    for _ in 0..count {
        sqlx::query("INSERT INTO link_clicks (link_id) VALUES ($1)")
            .bind(link_id)
            .execute(pool)
            .await
            .unwrap();
    }
}

pub async fn is_disabled(pool: &PgPool, link_id: i64) -> bool {
    sqlx::query_scalar("SELECT disabled FROM links WHERE id = $1")
        .bind(link_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub fn create_test_state(pool: PgPool) -> (AppState, mpsc::Receiver<ClickJob>) {
    create_test_state_with_locator(pool, Arc::new(NoopLocator))
}

pub fn create_test_state_with_locator(
    pool: PgPool,
    locator: Arc<dyn GeoLocator>,
) -> (AppState, mpsc::Receiver<ClickJob>) {
    let (tx, rx) = mpsc::channel(100);

    let visitors = VisitorService::new(locator, IpHasher::new(TEST_SECRET));
    let state = AppState::new(
        Arc::new(pool),
        Arc::new(NullCache::new()),
        tx,
        visitors,
        PageSigner::new(TEST_SECRET),
        TEST_DOMAIN,
    );

    (state, rx)
}

/// Places every address in one country.
pub struct FixedCountryLocator(pub &'static str);

impl GeoLocator for FixedCountryLocator {
    fn locate(&self, _ip: IpAddr) -> GeoInfo {
        GeoInfo::from_raw(Some(self.0), None, None)
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Injects a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "203.0.113.7:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
