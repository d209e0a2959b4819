//! Daily tick delivery and persistence retry.

use super::Gateway;
use std::sync::Arc;
use std::time::Duration;
use streak_store::StateStore;
use tracing::{error, info, warn};

/// Upper bound on a single sleep; the wall clock is re-read after each.
const MAX_SLEEP: Duration = Duration::from_secs(60);

impl Gateway {
    /// Background task: fire start-of-day and end-of-day ticks forever.
    pub(super) async fn tick_loop(self: Arc<Self>) {
        loop {
            let (kind, at) = self.schedule.next_tick(self.now());
            info!(
                "scheduler: next {kind} tick at {}",
                at.with_timezone(&self.schedule.timezone())
            );

            let woke = loop {
                let now = self.now();
                if now >= at {
                    break now;
                }
                let remaining = (at - now).to_std().unwrap_or_default().min(MAX_SLEEP);
                tokio::time::sleep(remaining).await;
            };

            // A stall (host suspend, clock jump) may have swallowed more than
            // this tick; catch-up replays whatever is due as of now.
            let late = (woke - at).to_std().unwrap_or_default();
            if late > MAX_SLEEP {
                warn!("scheduler: woke {}s after the {kind} tick, catching up", late.as_secs());
                self.run_catch_up().await;
                continue;
            }

            // Date the tick by its scheduled instant, not by when it woke up.
            let today = self.schedule.today(at);
            match self.run_tick(kind, today).await {
                Ok(report) => info!(
                    "scheduler: {kind} tick for {today}: {} chats, {} renamed, {} rename failures",
                    report.processed, report.renamed, report.failed
                ),
                Err(e) => error!("scheduler: {kind} tick for {today} not committed: {e}"),
            }
        }
    }

    /// Background task: rewrite the snapshot after a failed commit.
    pub(super) async fn flush_loop(store: StateStore, every: Duration) {
        loop {
            tokio::time::sleep(every).await;
            if !store.is_dirty().await {
                continue;
            }
            if let Err(e) = store.flush().await {
                warn!("state flush retry failed: {e}");
            }
        }
    }
}
