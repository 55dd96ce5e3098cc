//! Background worker applying click increments.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Retries after the first failed increment.
const MAX_RETRIES: usize = 3;

/// Consumes click events until every sender has been dropped.
///
/// At most `concurrency` increments are in flight at once. Each increment is
/// retried with jittered exponential backoff; a click that still fails is
/// logged and counted, never surfaced to the request that produced it.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = semaphore.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tasks.spawn(async move {
            let _permit = permit;
            process_click(repository.as_ref(), &event).await;
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Click worker stopped");
}

async fn process_click(repository: &dyn LinkRepository, event: &ClickEvent) {
    // 10ms, 20ms, 40ms before jitter
    let strategy = ExponentialBackoff::from_millis(2)
        .factor(5)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = Retry::start(strategy, || repository.increment_clicks(&event.short_id)).await;

    match result {
        Ok(true) => {
            metrics::counter!("clicks_recorded_total").increment(1);
        }
        Ok(false) => {
            debug!(short_id = %event.short_id, "Click for a link that no longer exists");
        }
        Err(e) => {
            metrics::counter!("clicks_failed_total").increment(1);
            warn!(short_id = %event.short_id, error = %e, "Failed to record click");
        }
    }
}
