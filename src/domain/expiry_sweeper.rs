//! Periodic removal of expired links.
//!
//! The sweep only touches the store. Cached entries carry their own expiry
//! and are re-validated on every hit, so a swept link never resolves from a
//! stale cache entry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::domain::clock::Clock;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Deletes every link whose expiry has passed. Deleting nothing is a normal outcome.
pub async fn purge_expired(
    repository: &dyn LinkRepository,
    clock: &dyn Clock,
) -> Result<u64, AppError> {
    let deleted = repository.delete_expired(clock.now()).await?;

    if deleted > 0 {
        metrics::counter!("expired_links_purged_total").increment(deleted);
        info!(deleted, "Cleanup: deleted expired links");
    } else {
        debug!("Cleanup: no expired links");
    }

    Ok(deleted)
}

/// Runs [`purge_expired`] immediately and then every `interval`, until
/// `shutdown` flips to `true` or its sender is dropped.
///
/// Failures are logged and the schedule continues.
pub async fn run_expiry_sweeper(
    repository: Arc<dyn LinkRepository>,
    clock: Arc<dyn Clock>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = purge_expired(repository.as_ref(), clock.as_ref()).await {
                    error!(error = %e, "Cleanup error");
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("Expiry sweeper stopped");
}
