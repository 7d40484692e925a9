//! Periodic cleanup of expired revocations and signing keys

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tollgate_core::SessionAuthenticator;
use tracing::{debug, error};

/// Run [`SessionAuthenticator::sweep`] every `every` until the handle is
/// aborted.
pub fn spawn_sweeper(sessions: Arc<SessionAuthenticator>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match sessions.sweep() {
                Ok(report) => debug!(
                    revocations_evicted = report.revocations_evicted,
                    keys_pruned = report.keys_pruned,
                    "Session sweep finished"
                ),
                Err(err) => error!("Session sweep failed: {}", err),
            }
        }
    })
}
