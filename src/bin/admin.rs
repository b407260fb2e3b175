//! CLI administration tool for link-edge.
//!
//! Operational helpers that work directly against the database and cache,
//! without going through the HTTP surface.
//!
//! # Usage
//!
//! ```bash
//! # Check database connection
//! cargo run --bin admin -- db check
//!
//! # Drop the cached copy of a link after editing it
//! cargo run --bin admin -- cache invalidate s.example.com promo
//!
//! # Clicks and unique visitors for a link
//! cargo run --bin admin -- stats s.example.com promo
//!
//! # Which geo rule applies to a visitor from Germany?
//! cargo run --bin admin -- geo test s.example.com promo DE
//!
//! # Hash a password for links.password_hash
//! cargo run --bin admin -- password hash 'correct horse'
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` (required for database commands)
//! - `REDIS_URL` (required for `cache invalidate`)
//! - `DEFAULT_DOMAIN` (substituted for `localhost` domains)

use link_edge::domain::continents::continent_for_country;
use link_edge::domain::entities::{GeoInfo, Link};
use link_edge::domain::geo_matcher::{GeoMatch, GeoOutcome, match_rules};
use link_edge::domain::repositories::{ClickRepository, GeoRuleRepository, LinkRepository};
use link_edge::infrastructure::cache::{JsonCache, LinkCache, RedisCache};
use link_edge::infrastructure::persistence::{
    PgClickRepository, PgGeoRuleRepository, PgLinkRepository,
};
use link_edge::utils::extract_domain::normalize_domain;
use link_edge::utils::password::hash_password;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

/// CLI tool for operating link-edge.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show clicks and unique visitors for a link
    Stats {
        domain: String,
        alias: String,
    },

    /// Show a link by id
    Link {
        id: i64,
    },

    /// Geo rule tools
    Geo {
        #[command(subcommand)]
        action: GeoAction,
    },

    /// Link password tools
    Password {
        #[command(subcommand)]
        action: PasswordAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove the cached link and its geo rules
    Invalidate { domain: String, alias: String },
}

#[derive(Subcommand)]
enum GeoAction {
    /// Dry-run the geo rules of a link for a visitor country
    Test {
        domain: String,
        alias: String,
        /// ISO 3166-1 alpha-2 country code
        country: String,
    },
}

#[derive(Subcommand)]
enum PasswordAction {
    /// Print an Argon2 hash suitable for `links.password_hash`
    Hash { password: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Password {
            action: PasswordAction::Hash { password },
        } => handle_password_hash(&password)?,
        Commands::Db { action } => handle_db_action(action, &*connect().await?).await?,
        Commands::Cache {
            action: CacheAction::Invalidate { domain, alias },
        } => handle_cache_invalidate(&connect().await?, &domain, &alias).await?,
        Commands::Stats { domain, alias } => {
            handle_stats(&connect().await?, &domain, &alias).await?
        }
        Commands::Link { id } => handle_link_show(&connect().await?, id).await?,
        Commands::Geo {
            action:
                GeoAction::Test {
                    domain,
                    alias,
                    country,
                },
        } => handle_geo_test(&connect().await?, &domain, &alias, &country).await?,
    }

    Ok(())
}

async fn connect() -> Result<Arc<PgPool>> {
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(Arc::new(pool))
}

fn default_domain() -> String {
    std::env::var("DEFAULT_DOMAIN").unwrap_or_else(|_| "localhost".to_string())
}

/// Looks a link up the same way the resolver does.
async fn find_link(pool: &Arc<PgPool>, domain: &str, alias: &str) -> Result<(String, Link)> {
    let domain = normalize_domain(domain, &default_domain());
    let repo = PgLinkRepository::new(pool.clone());

    let link = repo
        .find_by_domain_and_alias(&domain, alias.trim())
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("No link {}/{}", domain, alias))?;

    Ok((domain, link))
}

fn print_link(link: &Link) {
    let status = if link.disabled {
        "DISABLED".red()
    } else {
        "ACTIVE".green()
    };

    println!("  ID:          {}", link.id.to_string().bright_black());
    println!("  Short:       {}/{}", link.domain.cyan(), link.alias.cyan());
    println!("  Destination: {}", link.url.bright_white());
    println!("  Status:      {}", status);
    if link.is_password_protected() {
        println!("  Password:    {}", "protected".yellow());
    }
    if link.cloaking {
        println!("  Cloaking:    {}", "on".yellow());
    }
    if let Some(limit) = link.disable_link_after_clicks {
        println!("  Click limit: {}", limit);
    }
    if let Some(date) = link.disable_link_after_date {
        println!("  Expires:     {}", date.format("%Y-%m-%d %H:%M UTC"));
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✓ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;
            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;
            let clicks: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM link_clicks")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green().bold());
            println!("  Clicks:     {}", clicks.to_string().bright_green().bold());
            println!();
        }
    }

    Ok(())
}

/// Drops the cached link and geo rules so the next request reads the store.
///
/// Only Redis is shared between processes; the in-memory cache of a running
/// server expires on its own TTL.
async fn handle_cache_invalidate(pool: &Arc<PgPool>, domain: &str, alias: &str) -> Result<()> {
    let redis_url = std::env::var("REDIS_URL")
        .context("REDIS_URL must be set; in-memory caches expire on their own")?;

    let (domain, link) = find_link(pool, domain, alias).await?;

    let backend = RedisCache::connect(&redis_url)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let cache = JsonCache::new(backend, 1, Duration::from_secs(2));

    cache.invalidate_link(&domain, &link.alias).await;
    cache.invalidate_geo_rules(link.id).await;

    println!(
        "{} {}/{}",
        "✓ Cache invalidated for".green().bold(),
        domain.cyan(),
        link.alias.cyan()
    );

    Ok(())
}

async fn handle_stats(pool: &Arc<PgPool>, domain: &str, alias: &str) -> Result<()> {
    let (_, link) = find_link(pool, domain, alias).await?;
    let clicks = PgClickRepository::new(pool.clone());

    let total = clicks
        .count_clicks(link.id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;
    let unique = clicks
        .count_unique_visits(link.id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let by_trigger: Vec<(String, i64)> = sqlx::query_as(
        "SELECT trigger_kind, COUNT(*) FROM link_clicks WHERE link_id = $1 \
         GROUP BY trigger_kind ORDER BY trigger_kind",
    )
    .bind(link.id)
    .fetch_all(pool.as_ref())
    .await?;

    println!("{}", "Link statistics".bright_blue().bold());
    println!();
    print_link(&link);
    println!();
    println!("  Clicks:          {}", total.to_string().bright_green().bold());
    println!("  Unique visitors: {}", unique.to_string().bright_green().bold());

    for (trigger, count) in by_trigger {
        println!("    {:<14} {}", trigger, count);
    }
    println!();

    Ok(())
}

async fn handle_link_show(pool: &Arc<PgPool>, id: i64) -> Result<()> {
    let link = PgLinkRepository::new(pool.clone())
        .find_by_id(id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
        .with_context(|| format!("No link with id {}", id))?;

    print_link(&link);
    Ok(())
}

/// Evaluates a link's geo rules for a country without resolving or recording anything.
async fn handle_geo_test(
    pool: &Arc<PgPool>,
    domain: &str,
    alias: &str,
    country: &str,
) -> Result<()> {
    let (_, link) = find_link(pool, domain, alias).await?;
    let rules = PgGeoRuleRepository::new(pool.clone())
        .list_by_link(link.id)
        .await
        .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    let geo = GeoInfo::from_raw(Some(country), None, None);
    let continent = geo
        .country
        .as_deref()
        .and_then(continent_for_country)
        .unwrap_or("unknown");

    println!(
        "{} {}/{} from {} ({})",
        "Geo test:".bright_blue().bold(),
        link.domain.cyan(),
        link.alias.cyan(),
        geo.country.as_deref().unwrap_or("unknown").bright_white(),
        continent
    );
    println!("  Rules: {}", rules.len());

    match match_rules(&rules, geo.country.as_deref()) {
        GeoMatch::Unmatched => {
            println!("  {} -> {}", "no rule matched".yellow(), link.url);
        }
        GeoMatch::Matched {
            rule_id,
            outcome: GeoOutcome::Redirect { destination },
        } => {
            println!(
                "  {} #{} -> {}",
                "redirect".green().bold(),
                rule_id,
                destination
            );
        }
        GeoMatch::Matched {
            rule_id,
            outcome: GeoOutcome::Block { message },
        } => {
            println!(
                "  {} #{} ({})",
                "blocked".red().bold(),
                rule_id,
                message.as_deref().unwrap_or("default message")
            );
        }
    }

    Ok(())
}

fn handle_password_hash(password: &str) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let hash = hash_password(password).map_err(|e| anyhow::anyhow!("{}", e))?;
    println!("{}", hash);

    Ok(())
}
