//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache selection, worker spawning, and the
//! Axum server lifecycle.

use crate::application::services::{ClickRecorder, VisitorService};
use crate::config::Config;
use crate::domain::click_event::ClickJob;
use crate::domain::click_worker::run_click_worker;
use crate::infrastructure::cache::{JsonCache, LinkCache, MemoryCache, NullCache, RedisCache};
use crate::infrastructure::geoip::{GeoLocator, MaxMindLocator, NoopLocator};
use crate::infrastructure::persistence::PgClickRepository;
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::ip_hash::IpHasher;
use crate::utils::page_signer::PageSigner;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// How long queued clicks may take to flush after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Link cache (Redis, in-memory fallback, or disabled)
/// - GeoIP locator
/// - Background click worker
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    info!("Migrations applied");

    let cache = build_cache(&config).await;
    let locator = build_locator(&config);
    let visitors = VisitorService::new(locator, IpHasher::new(&config.ip_hash_secret));

    let pool = Arc::new(pool);
    let (click_tx, click_rx) = mpsc::channel::<ClickJob>(config.click_queue_capacity);

    let recorder = Arc::new(ClickRecorder::new(Arc::new(PgClickRepository::new(
        pool.clone(),
    ))));
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        recorder,
        config.click_worker_concurrency,
    ));

    let state = AppState::new(
        pool,
        cache,
        click_tx,
        visitors,
        PageSigner::new(&config.ip_hash_secret),
        &config.default_domain,
    )
    .with_behind_proxy(config.behind_proxy);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router owned every sender; the worker now drains what is queued.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(_) => info!("Click worker drained"),
        Err(_) => warn!(
            "Click worker did not drain within {}s, pending clicks dropped",
            WORKER_DRAIN_TIMEOUT.as_secs()
        ),
    }

    Ok(())
}

/// Connection options with a server-side `statement_timeout`, so a stuck
/// query fails instead of holding a redirect open.
fn connect_options(database_url: &str, statement_timeout_ms: u64) -> Result<PgConnectOptions> {
    let options = PgConnectOptions::from_str(database_url)
        .context("Invalid DATABASE_URL")?
        .options([("statement_timeout", statement_timeout_ms)]);

    Ok(options)
}

async fn connect_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect_with(connect_options(
            &config.database_url,
            config.db_statement_timeout_ms,
        )?)
        .await
        .context("Failed to connect to database")?;

    info!("Connected to database");
    Ok(pool)
}

/// Picks the cache backend.
///
/// Redis when configured and reachable, otherwise a bounded in-process
/// cache; `CACHE_ENABLED=false` disables caching.
async fn build_cache(config: &Config) -> Arc<dyn LinkCache> {
    if !config.cache_enabled {
        info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    }

    let timeout = Duration::from_millis(config.cache_timeout_ms);

    if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url).await {
            Ok(redis) => {
                info!("Cache enabled (Redis)");
                return Arc::new(JsonCache::new(redis, config.cache_ttl_seconds, timeout));
            }
            Err(e) => {
                warn!("Failed to connect to Redis: {}. Using in-memory cache.", e);
            }
        }
    }

    info!(
        capacity = config.memory_cache_capacity,
        "Cache enabled (in-memory)"
    );
    Arc::new(JsonCache::new(
        MemoryCache::new(config.memory_cache_capacity),
        config.cache_ttl_seconds,
        timeout,
    ))
}

fn build_locator(config: &Config) -> Arc<dyn GeoLocator> {
    let Some(path) = &config.geoip_db_path else {
        info!("GeoIP database not configured, relying on edge headers");
        return Arc::new(NoopLocator);
    };

    match MaxMindLocator::open(path) {
        Ok(locator) => {
            info!(path = %path, "GeoIP database loaded");
            Arc::new(locator)
        }
        Err(e) => {
            warn!("{}. Continuing without IP geolocation.", e);
            Arc::new(NoopLocator)
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
