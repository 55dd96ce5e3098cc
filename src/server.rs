//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, background tasks, and the Axum
//! server lifecycle including graceful shutdown.

use crate::application::services::{AuthService, LinkService, RedirectService};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::expiry_sweeper::run_expiry_sweeper;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::routes::{RouterOptions, app_router};
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// How long to wait for queued clicks to be written during shutdown.
const CLICK_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens the PostgreSQL pool with the configured limits.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");
    Ok(pool)
}

/// Connects to Redis if configured, falling back to [`NullCache`].
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker and expiry sweeper
/// - Axum HTTP server
///
/// On SIGINT or SIGTERM the server stops accepting connections, the sweeper
/// stops, and the click worker drains the queue before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Migrations applied");

    let cache = connect_cache(&config).await;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        repository.clone(),
        config.click_worker_concurrency,
    ));
    tracing::info!("Click worker started");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(run_expiry_sweeper(
        repository.clone(),
        clock.clone(),
        config.cleanup_interval(),
        shutdown_rx,
    ));
    tracing::info!(
        interval_ms = config.cleanup_interval_ms,
        "Expiry sweeper started"
    );

    let state = AppState {
        link_service: Arc::new(LinkService::new(
            repository.clone(),
            cache.clone(),
            clock.clone(),
            config.cache_ttl_seconds,
            config.base_url.clone(),
        )),
        redirect_service: Arc::new(RedirectService::new(
            repository,
            cache.clone(),
            clock,
            click_tx.clone(),
            config.cache_ttl_seconds,
        )),
        auth_service: Arc::new(AuthService::new(&config.admin_api_key)),
        cache,
        click_sender: click_tx,
    };

    let app = app_router(state, RouterOptions::from_config(&config));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, shutting down background tasks");

    // The router (and with it every click sender) has been dropped by now,
    // so the worker finishes once the queue is empty.
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "Expiry sweeper task failed");
    }

    match tokio::time::timeout(CLICK_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Click worker task failed"),
        Err(_) => tracing::warn!("Timed out waiting for queued clicks to be written"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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

    tracing::info!("Shutdown signal received");
}
