//! Gateway: the main event loop connecting the chat channel, the state
//! store, and the daily tick schedule.
//!
//! Includes: catch-up on startup, the tick and flush background loops,
//! command routing, and graceful shutdown.

mod routing;
mod scheduler;
mod sync;


pub use sync::AdminCommand;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use streak_core::{
    config::SyncConfig,
    message::ChatId,
    schedule::DaySchedule,
    title::TitleCodec,
    traits::Channel,
};
use streak_store::StateStore;
use tracing::{error, info, warn};

/// Source of the current instant. Swapped out in tests.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// The central gateway that applies chat activity and ticks to streak state.
pub struct Gateway {
    pub(super) channel: Arc<dyn Channel>,
    pub(super) store: StateStore,
    pub(super) codec: TitleCodec,
    pub(super) schedule: DaySchedule,
    pub(super) rename_concurrency: usize,
    pub(super) rename_timeout: Duration,
    pub(super) flush_retry: Duration,
    pub(super) default_language: String,
    pub(super) clock: Clock,
    pub(super) uptime: Instant,
    /// Monotonic stamp handed to every title render, in commit order.
    pub(super) render_seq: AtomicU64,
    /// Last render stamp applied per chat; an older render never overwrites
    /// a newer one.
    pub(super) applied_renders: std::sync::Mutex<HashMap<ChatId, Arc<tokio::sync::Mutex<u64>>>>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        channel: Arc<dyn Channel>,
        store: StateStore,
        codec: TitleCodec,
        schedule: DaySchedule,
        sync: &SyncConfig,
        default_language: String,
    ) -> Self {
        Self {
            channel,
            store,
            codec,
            schedule,
            rename_concurrency: sync.rename_concurrency.max(1),
            rename_timeout: Duration::from_secs(sync.rename_timeout_secs),
            flush_retry: Duration::from_secs(sync.flush_retry_secs.max(1)),
            default_language,
            clock: Arc::new(Utc::now),
            uptime: Instant::now(),
            render_seq: AtomicU64::new(0),
            applied_renders: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Replace the wall clock.
    #[cfg(test)]
    pub(crate) fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Override the per-rename timeout.
    #[cfg(test)]
    pub(crate) fn with_rename_timeout(mut self, timeout: Duration) -> Self {
        self.rename_timeout = timeout;
        self
    }

    pub(super) fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Run the main event loop.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Streak gateway starting | channel: {} | timezone: {}",
            self.channel.name(),
            self.schedule.timezone()
        );

        // Replay ticks missed while the process was down.
        self.run_catch_up().await;

        let mut rx = self.channel.start().await?;
        info!("Channel started: {}", self.channel.name());

        let tick_gw = self.clone();
        let tick_handle = tokio::spawn(async move {
            tick_gw.tick_loop().await;
        });

        let flush_store = self.store.clone();
        let flush_every = self.flush_retry;
        let flush_handle = tokio::spawn(async move {
            Self::flush_loop(flush_store, flush_every).await;
        });

        info!("Streak gateway ready");

        // Main event loop with graceful shutdown.
        loop {
            tokio::select! {
                Some(event) = rx.recv() => {
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.dispatch_event(event).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown(&tick_handle, &flush_handle).await;
        Ok(())
    }

    /// Replay missed ticks and log the outcome. A failed commit stays dirty
    /// and is retried by the flush loop.
    pub(super) async fn run_catch_up(&self) {
        match self.catch_up().await {
            Ok(report) if report.processed > 0 => info!(
                "catch-up: {} chats advanced, {} renamed, {} rename failures",
                report.processed, report.renamed, report.failed
            ),
            Ok(_) => {}
            Err(e) => error!("catch-up not committed: {e}"),
        }
    }

    /// Graceful shutdown: stop background loops, stop the channel, flush.
    async fn shutdown(
        &self,
        tick_handle: &tokio::task::JoinHandle<()>,
        flush_handle: &tokio::task::JoinHandle<()>,
    ) {
        tick_handle.abort();
        flush_handle.abort();

        if let Err(e) = self.channel.stop().await {
            warn!("failed to stop channel {}: {e}", self.channel.name());
        }

        match self.store.flush().await {
            Ok(true) => info!("pending state flushed on shutdown"),
            Ok(false) => {}
            Err(e) => warn!("failed to flush state on shutdown: {e}"),
        }

        info!(
            "Streak gateway stopped after {}s",
            self.uptime.elapsed().as_secs()
        );
    }
}
