//! Short link resolution: cache-fronted lookup, policy checks, geo rules,
//! UTM rewriting and click dispatch.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickJob;
use crate::domain::click_worker::ClickQueue;
use crate::domain::entities::{GeoRule, Link, TriggerKind, VisitorContext};
use crate::domain::geo_matcher::{GeoMatch, GeoOutcome, match_rules};
use crate::domain::repositories::{ClickRepository, GeoRuleRepository, LinkRepository};
use crate::error::AppError;
use crate::infrastructure::cache::LinkCache;
use crate::infrastructure::persistence::{
    PgClickRepository, PgGeoRuleRepository, PgLinkRepository,
};
use crate::utils::extract_domain::normalize_domain;
use crate::utils::password::verify_password;
use crate::utils::utm::apply_utm;

/// Input to [`ResolutionService::resolve`].
#[derive(Debug, Clone)]
pub struct ResolveRequest {
    pub domain: String,
    pub alias: String,
    pub visitor: VisitorContext,
    /// HEAD request or prefetch hint; resolved normally but never counted.
    pub probe: bool,
    /// The visitor already passed the password prompt for this link.
    pub password_verified: bool,
}

impl ResolveRequest {
    pub fn new(domain: impl Into<String>, alias: impl Into<String>, visitor: VisitorContext) -> Self {
        Self {
            domain: domain.into(),
            alias: alias.into(),
            visitor,
            probe: false,
            password_verified: false,
        }
    }
}

/// Decision for one resolution request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    PasswordRequired {
        alias: String,
    },
    Blocked {
        message: Option<String>,
        rule_id: i64,
    },
    Redirect {
        destination: String,
        cloaking: bool,
        rule_id: Option<i64>,
    },
}

impl Resolution {
    fn label(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::PasswordRequired { .. } => "password_required",
            Self::Blocked { .. } => "blocked",
            Self::Redirect { .. } => "redirect",
        }
    }
}

/// Turns `(domain, alias, visitor)` into a [`Resolution`].
///
/// Steps, in order: domain normalization, cache then store lookup, password
/// gate, disabled flag, expiry (date, then click count read from the store),
/// geo rules, UTM rewriting. Clicks are handed to the [`ClickQueue`] and never
/// awaited.
pub struct ResolutionService<L: LinkRepository, G: GeoRuleRepository, C: ClickRepository> {
    links: Arc<L>,
    geo_rules: Arc<G>,
    clicks: Arc<C>,
    cache: Arc<dyn LinkCache>,
    queue: Arc<dyn ClickQueue>,
    default_domain: String,
    cache_ttl: Option<u64>,
}

/// Resolver wired to the Postgres repositories.
pub type PgResolutionService =
    ResolutionService<PgLinkRepository, PgGeoRuleRepository, PgClickRepository>;

impl<L, G, C> ResolutionService<L, G, C>
where
    L: LinkRepository,
    G: GeoRuleRepository,
    C: ClickRepository,
{
    pub fn new(
        links: Arc<L>,
        geo_rules: Arc<G>,
        clicks: Arc<C>,
        cache: Arc<dyn LinkCache>,
        queue: Arc<dyn ClickQueue>,
        default_domain: impl Into<String>,
    ) -> Self {
        Self {
            links,
            geo_rules,
            clicks,
            cache,
            queue,
            default_domain: default_domain.into(),
            cache_ttl: None,
        }
    }

    /// Overrides the cache TTL; `None` uses the cache's default.
    pub fn with_cache_ttl(mut self, ttl_seconds: Option<u64>) -> Self {
        self.cache_ttl = ttl_seconds;
        self
    }

    pub fn normalize_domain(&self, raw: &str) -> String {
        normalize_domain(raw, &self.default_domain)
    }

    /// Resolves a short link for one visitor.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the domain or alias is blank.
    /// Any other failure becomes a detail-free [`AppError::Internal`]; the
    /// cause is logged.
    pub async fn resolve(&self, request: ResolveRequest) -> Result<Resolution, AppError> {
        let result = self.resolve_inner(request).await;

        match &result {
            Ok(resolution) => {
                metrics::counter!("resolutions_total", "outcome" => resolution.label())
                    .increment(1);
            }
            Err(e) if e.is_validation() => {}
            Err(e) => {
                error!(error = %e, "Link resolution failed");
                metrics::counter!("resolutions_total", "outcome" => "error").increment(1);
                return Err(AppError::internal("Failed to resolve link", json!({})));
            }
        }

        result
    }

    async fn resolve_inner(&self, request: ResolveRequest) -> Result<Resolution, AppError> {
        let alias = request.alias.trim();
        if alias.is_empty() {
            return Err(AppError::bad_request("Alias is required", json!({})));
        }
        let domain = self.normalize_domain(&request.domain);
        if domain.is_empty() {
            return Err(AppError::bad_request("Domain is required", json!({})));
        }

        let Some(link) = self.find_link(&domain, alias).await? else {
            debug!(domain, alias, "Link not found");
            return Ok(Resolution::NotFound);
        };

        if link.is_password_protected() && !request.password_verified {
            return Ok(Resolution::PasswordRequired {
                alias: link.alias.clone(),
            });
        }

        if link.disabled {
            return Ok(Resolution::NotFound);
        }

        if self.is_expired(&link).await? {
            self.expire(&domain, &link).await?;
            return Ok(Resolution::NotFound);
        }

        let rules = self.geo_rules_for(link.id).await?;
        let geo_match = match_rules(&rules, request.visitor.geo.country.as_deref());

        let (resolution, trigger, rule_id) = match geo_match {
            GeoMatch::Matched {
                rule_id,
                outcome: GeoOutcome::Block { message },
            } => (
                Resolution::Blocked { message, rule_id },
                TriggerKind::Blocked,
                Some(rule_id),
            ),
            GeoMatch::Matched {
                rule_id,
                outcome: GeoOutcome::Redirect { destination },
            } => (
                Resolution::Redirect {
                    destination: apply_utm(&destination, link.utm_params.as_ref()),
                    cloaking: link.cloaking,
                    rule_id: Some(rule_id),
                },
                TriggerKind::GeoRedirect,
                Some(rule_id),
            ),
            GeoMatch::Unmatched => (
                Resolution::Redirect {
                    destination: apply_utm(&link.url, link.utm_params.as_ref()),
                    cloaking: link.cloaking,
                    rule_id: None,
                },
                TriggerKind::Direct,
                None,
            ),
        };

        if !link.is_password_protected() {
            let job = ClickJob::new(link, request.visitor, trigger)
                .with_geo_rule(rule_id)
                .with_probe(request.probe);
            self.queue.enqueue(job);
        }

        Ok(resolution)
    }

    /// Reads a link from the cache, falling back to the store.
    ///
    /// A store hit is written back to the cache in a detached task.
    async fn find_link(&self, domain: &str, alias: &str) -> Result<Option<Link>, AppError> {
        if let Some(link) = self.cache.get_link(domain, alias).await {
            return Ok(Some(link));
        }

        let Some(link) = self.links.find_by_domain_and_alias(domain, alias).await? else {
            return Ok(None);
        };

        let cache = self.cache.clone();
        let (domain, alias, cached, ttl) = (
            domain.to_string(),
            alias.to_string(),
            link.clone(),
            self.cache_ttl,
        );
        tokio::spawn(async move {
            cache.set_link(&domain, &alias, &cached, ttl).await;
        });

        Ok(Some(link))
    }

    async fn is_expired(&self, link: &Link) -> Result<bool, AppError> {
        if link.is_expired_at(Utc::now()) {
            return Ok(true);
        }
        if link.disable_link_after_clicks.is_none() {
            return Ok(false);
        }

        let recorded = self.clicks.count_clicks(link.id).await?;
        Ok(link.is_click_limit_reached(recorded))
    }

    async fn expire(&self, domain: &str, link: &Link) -> Result<(), AppError> {
        if self.links.disable(link.id).await? {
            info!(link_id = link.id, alias = %link.alias, "Link disabled by expiry policy");
        }
        self.cache.invalidate_link(domain, &link.alias).await;
        Ok(())
    }

    async fn geo_rules_for(&self, link_id: i64) -> Result<Vec<GeoRule>, AppError> {
        if let Some(rules) = self.cache.get_geo_rules(link_id).await {
            return Ok(rules);
        }

        let rules = self.geo_rules.list_by_link(link_id).await?;

        let cache = self.cache.clone();
        let (cached, ttl) = (rules.clone(), self.cache_ttl);
        tokio::spawn(async move {
            cache.set_geo_rules(link_id, &cached, ttl).await;
        });

        Ok(rules)
    }

    /// Checks a submitted password for a protected link.
    ///
    /// Returns `Ok(true)` for links without a password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the link does not exist and
    /// [`AppError::Internal`] on store errors.
    pub async fn verify_link_password(
        &self,
        domain: &str,
        alias: &str,
        password: &str,
    ) -> Result<bool, AppError> {
        let domain = self.normalize_domain(domain);
        let link = self
            .find_link(&domain, alias.trim())
            .await?
            .ok_or_else(|| AppError::not_found("Link not found", json!({})))?;

        let Some(hash) = link.password_hash.as_deref().filter(|h| !h.is_empty()) else {
            return Ok(true);
        };

        match verify_password(password, hash) {
            Ok(valid) => Ok(valid),
            Err(e) => {
                warn!(link_id = link.id, error = %e, "Stored password hash is unusable");
                Ok(false)
            }
        }
    }

    /// Checks store connectivity.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.links.ping().await
    }
}
