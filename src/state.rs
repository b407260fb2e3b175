//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::application::services::{PgResolutionService, ResolutionService, VisitorService};
use crate::domain::click_event::ClickJob;
use crate::infrastructure::cache::LinkCache;
use crate::infrastructure::persistence::{
    PgClickRepository, PgGeoRuleRepository, PgLinkRepository,
};
use crate::utils::page_signer::PageSigner;

#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PgResolutionService>,
    pub visitors: Arc<VisitorService>,
    pub cache: Arc<dyn LinkCache>,
    pub click_sender: mpsc::Sender<ClickJob>,
    /// Signs the cloak and block page parameters.
    pub pages: PageSigner,
    /// Trust `CF-Connecting-IP` / `X-Real-IP` / `X-Forwarded-For`.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires the Postgres repositories, the cache and the click queue into
    /// a resolver.
    pub fn new(
        pool: Arc<PgPool>,
        cache: Arc<dyn LinkCache>,
        click_sender: mpsc::Sender<ClickJob>,
        visitors: VisitorService,
        pages: PageSigner,
        default_domain: impl Into<String>,
    ) -> Self {
        let resolver = ResolutionService::new(
            Arc::new(PgLinkRepository::new(pool.clone())),
            Arc::new(PgGeoRuleRepository::new(pool.clone())),
            Arc::new(PgClickRepository::new(pool)),
            cache.clone(),
            Arc::new(click_sender.clone()),
            default_domain,
        );

        Self {
            resolver: Arc::new(resolver),
            visitors: Arc::new(visitors),
            cache,
            click_sender,
            pages,
            behind_proxy: false,
        }
    }

    pub fn with_behind_proxy(mut self, behind_proxy: bool) -> Self {
        self.behind_proxy = behind_proxy;
        self
    }
}
