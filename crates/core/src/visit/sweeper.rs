//! Periodic removal of expired visit keys.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;

use super::VisitCache;

/// Purge expired keys from `cache` every `every`, starting one interval after the call.
///
/// Failures are logged and the next tick tries again. The task runs until
/// the returned handle is aborted or the runtime shuts down.
pub fn spawn_purge_task(cache: Arc<dyn VisitCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match cache.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(deleted) => tracing::debug!(deleted, "purged expired visit keys"),
                Err(e) => tracing::warn!(error = %e, "visit key purge failed"),
            }
        }
    })
}
