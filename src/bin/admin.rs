//! CLI administration tool for shortlink.
//!
//! Manages links directly against the database, without going through the
//! HTTP API. When Redis is configured, cache entries are invalidated the same
//! way the admin endpoints do it.
//!
//! # Usage
//!
//! ```bash
//! # List links, newest first
//! cargo run --bin admin -- links list --page 1 --per-page 20 --query example
//!
//! # Deactivate / reactivate a link
//! cargo run --bin admin -- links deactivate demo
//! cargo run --bin admin -- links activate demo
//!
//! # Delete a link permanently
//! cargo run --bin admin -- links delete demo
//!
//! # Purge expired links now
//! cargo run --bin admin -- cleanup
//!
//! # Generate a value for ADMIN_API_KEY
//! cargo run --bin admin -- key generate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_*` (required): PostgreSQL connection
//! - `REDIS_URL` or `REDIS_*` (optional): cache to invalidate
//! - `BASE_URL` (optional): prefix used to display short URLs
//! - `CACHE_TTL_SECONDS` (optional): TTL for cache entries the CLI writes

use shortlink::application::services::LinkService;
use shortlink::config::{Config, mask_connection_string};
use shortlink::domain::clock::SystemClock;
use shortlink::domain::entities::ShortLink;
use shortlink::infrastructure::cache::{CacheService, NullCache, RedisCache};
use shortlink::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing shortlink.
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
    /// Manage short links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Delete expired links now
    Cleanup,

    /// Show statistics
    Stats,

    /// Admin API key helpers
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinksAction {
    /// List links, newest first
    List {
        #[arg(short, long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        per_page: i64,

        /// Substring of the short id or original URL
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Make a link resolvable again
    Activate { short_id: String },

    /// Stop a link from resolving without deleting it
    Deactivate { short_id: String },

    /// Delete a link permanently
    Delete {
        short_id: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Admin API key subcommands.
#[derive(Subcommand)]
enum KeyAction {
    /// Generate a random key suitable for ADMIN_API_KEY
    Generate,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if let Commands::Key { action } = &cli.command {
        return handle_key_action(action);
    }

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .with_context(|| {
            format!(
                "Failed to connect to database at {}",
                mask_connection_string(&database_url)
            )
        })?;

    match cli.command {
        Commands::Links { action } => handle_links_action(action, &pool).await?,
        Commands::Cleanup => handle_cleanup(&pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
        Commands::Key { .. } => {}
    }

    Ok(())
}

/// Builds the same service the HTTP API uses, with Redis if configured.
async fn link_service(pool: &PgPool) -> Result<LinkService> {
    let cache: Arc<dyn CacheService> = match Config::load_redis_url() {
        Some(url) => match RedisCache::connect(&url).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                println!(
                    "{}",
                    format!("⚠️  Redis unavailable ({}), cache will not be invalidated", e)
                        .yellow()
                );
                Arc::new(NullCache::new())
            }
        },
        None => Arc::new(NullCache::new()),
    };

    let base_url =
        std::env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let cache_ttl_seconds = Config::load_cache_ttl_seconds()?;

    Ok(LinkService::new(
        Arc::new(PgLinkRepository::new(Arc::new(pool.clone()))),
        cache,
        Arc::new(SystemClock),
        cache_ttl_seconds,
        base_url,
    ))
}

/// Dispatches link management commands.
async fn handle_links_action(action: LinksAction, pool: &PgPool) -> Result<()> {
    let service = link_service(pool).await?;

    match action {
        LinksAction::List {
            page,
            per_page,
            query,
        } => list_links(&service, page, per_page, query).await?,
        LinksAction::Activate { short_id } => set_active(&service, &short_id, true).await?,
        LinksAction::Deactivate { short_id } => set_active(&service, &short_id, false).await?,
        LinksAction::Delete { short_id, yes } => delete_link(&service, &short_id, yes).await?,
    }

    Ok(())
}

fn status_label(link: &ShortLink) -> ColoredString {
    if !link.is_active {
        "INACTIVE".yellow()
    } else if link.is_expired_at(Utc::now()) {
        "EXPIRED".red()
    } else {
        "ACTIVE".green()
    }
}

/// Lists links as a table.
///
/// # Output Format
///
/// ```text
/// 📋 Links (page 1, 2 of 2)
///
///   Short ID     Clicks   Status     Expires            URL
///   ────────────────────────────────────────────────────────────────
///   demo         12       ACTIVE     2025-01-08 00:00   https://example.com/a
///   Xy3_ab9Q     0        INACTIVE   never              https://example.com/b
/// ```
async fn list_links(
    service: &LinkService,
    page: i64,
    per_page: i64,
    query: Option<String>,
) -> Result<()> {
    let result = service
        .list_links(page, per_page, query)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    println!(
        "{}",
        format!(
            "📋 Links (page {}, {} of {})",
            result.page,
            result.items.len(),
            result.total
        )
        .bright_blue()
        .bold()
    );
    println!();

    if result.items.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<12} {:<8} {:<10} {:<18} {}",
        "Short ID".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Status".bright_white().bold(),
        "Expires".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(80).bright_black());

    for link in &result.items {
        let expires = link
            .expires_at
            .map(|e| e.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<12} {:<8} {:<10} {:<18} {}",
            link.short_id.cyan(),
            link.clicks.to_string().bright_white(),
            status_label(link),
            expires.bright_black(),
            link.original_url
        );
    }

    println!();
    Ok(())
}

async fn set_active(service: &LinkService, short_id: &str, is_active: bool) -> Result<()> {
    let link = service
        .set_active(short_id, is_active)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to update {}: {}", short_id, e))?;

    let verb = if is_active { "activated" } else { "deactivated" };
    println!(
        "{}",
        format!("✅ {} {}", link.short_id, verb).green().bold()
    );
    println!("  URL:    {}", service.short_url(&link.short_id).cyan());
    println!("  Status: {}", status_label(&link));

    Ok(())
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(service: &LinkService, short_id: &str, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = service
        .get_link(short_id)
        .await
        .map_err(|e| anyhow::anyhow!("{}: {}", short_id, e))?;

    println!("  Short ID: {}", link.short_id.cyan());
    println!("  URL:      {}", link.original_url);
    println!("  Clicks:   {}", link.clicks.to_string().bright_white());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link permanently?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    service
        .delete_link(short_id)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete {}: {}", short_id, e))?;

    println!("{}", "✅ Link deleted".green().bold());
    Ok(())
}

async fn handle_cleanup(pool: &PgPool) -> Result<()> {
    println!("{}", "🧹 Purging expired links...".bright_blue());

    let deleted = link_service(pool)
        .await?
        .purge_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {}", e))?;

    println!(
        "{}",
        format!("✅ Deleted {} expired link(s)", deleted).green().bold()
    );
    Ok(())
}

/// Displays link counts by state and the total click count.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (total, active, expired, clicks): (i64, i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), \
                COUNT(*) FILTER (WHERE is_active AND (expires_at IS NULL OR expires_at > NOW())), \
                COUNT(*) FILTER (WHERE expires_at IS NOT NULL AND expires_at <= NOW()), \
                COALESCE(SUM(clicks), 0)::BIGINT \
         FROM short_links",
    )
    .fetch_one(pool)
    .await?;

    println!("  Links:        {}", total.to_string().bright_green().bold());
    println!("  Resolvable:   {}", active.to_string().bright_green().bold());
    println!("  Expired:      {}", expired.to_string().yellow().bold());
    println!("  Total clicks: {}", clicks.to_string().bright_green().bold());
    println!();

    Ok(())
}

fn handle_key_action(action: &KeyAction) -> Result<()> {
    match action {
        KeyAction::Generate => {
            let mut bytes = [0u8; 32];
            getrandom::fill(&mut bytes)
                .map_err(|e| anyhow::anyhow!("Failed to generate random bytes: {}", e))?;
            let key = hex::encode(bytes);

            println!("{}", "🔑 New admin API key".bright_blue().bold());
            println!();
            println!("  ADMIN_API_KEY={}", key.bright_yellow().bold());
            println!();
            println!("{}", "Send it with admin requests:".bright_white());
            println!(
                "  curl -H \"x-admin-api-key: {}\" http://localhost:3000/api/admin/urls",
                key.bright_yellow()
            );
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
