//! Periodic cleanup of finished verification jobs.
//!
//! Spawned once at startup. Removes done jobs whose last write is older than
//! the configured retention period, on a fixed `tokio::time::interval`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::store::InMemoryJobStore;

/// How often the cleanup runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the job retention loop until the runtime shuts down.
///
/// The first pass runs immediately.
pub async fn run(store: Arc<InMemoryJobStore>, retention: Duration, every: Duration) {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = every.as_secs(),
        "Job retention started"
    );

    let retention = match chrono::Duration::from_std(retention) {
        Ok(retention) => retention,
        Err(e) => {
            tracing::error!(error = %e, "Job retention: period out of range, cleanup disabled");
            return;
        }
    };

    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let cutoff = Utc::now() - retention;
        let purged = store.purge_done_before(cutoff).await;
        if purged > 0 {
            let remaining = store.len().await;
            tracing::info!(purged, remaining, "Job retention: purged finished jobs");
        } else {
            tracing::debug!("Job retention: nothing to purge");
        }
    }
}
