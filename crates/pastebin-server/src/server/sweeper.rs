//! Background removal of expired pastes.

use std::sync::Arc;
use std::time::Duration;

use pastebin::RecordStore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Call [`RecordStore::purge_expired`] every `interval` until aborted.
///
/// Errors are logged and the next tick tries again. The store call is
/// blocking, so each sweep runs on the blocking pool.
pub fn spawn_sweeper(store: Arc<dyn RecordStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let store = Arc::clone(&store);
            match tokio::task::spawn_blocking(move || store.purge_expired()).await {
                Ok(Ok(0)) => debug!("sweep found nothing expired"),
                Ok(Ok(removed)) => info!(removed, "swept expired pastes"),
                Ok(Err(e)) => warn!(error = %e, "sweep failed"),
                Err(e) => warn!(error = %e, "sweep task panicked"),
            }
        }
    })
}
