//! Streak orchestration: applies events to chat records under the store
//! lock, then brings chat titles in line with what was committed.
//!
//! Titles are only touched after a successful commit. Rename failures are
//! logged and counted; they never roll back state.

use super::Gateway;
use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use streak_core::{
    error::StreakError,
    message::ChatId,
    schedule::TickKind,
    streak::{transition, ChatRecord, Status, StreakEvent, TitleDirective},
    title::Glyph,
};
use streak_store::Snapshot;
use tracing::{debug, info, warn};

/// Administrative overrides issued from chat commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Set(u32),
    Reset,
}

impl AdminCommand {
    fn event(self) -> StreakEvent {
        match self {
            Self::Set(value) => StreakEvent::AdminSet(value),
            Self::Reset => StreakEvent::AdminReset,
        }
    }
}

/// Outcome of applying one event to many chats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Chats the event was applied to.
    pub processed: usize,
    pub renamed: usize,
    /// Renames that failed or timed out.
    pub failed: usize,
}

/// A title render decided under the store lock and applied after it.
#[derive(Debug, Clone, Copy)]
pub(super) struct PendingRender {
    chat_id: ChatId,
    seq: u64,
    streak: u32,
    glyph: Glyph,
}

#[cfg(test)]
impl PendingRender {
    pub(super) fn new(chat_id: ChatId, seq: u64, streak: u32, glyph: Glyph) -> Self {
        Self {
            chat_id,
            seq,
            streak,
            glyph,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RenderOutcome {
    Renamed,
    Skipped,
    Failed,
}

impl Gateway {
    // --- Event application (inside the store lock) ---

    /// Apply `event` to one chat's record in place.
    fn apply_event(
        &self,
        snapshot: &mut Snapshot,
        chat_id: ChatId,
        event: StreakEvent,
        today: NaiveDate,
    ) -> Option<PendingRender> {
        let record = snapshot.record_mut(chat_id);
        let (next, directive) = transition(record, event, today);
        *record = next;
        match directive {
            TitleDirective::None => None,
            TitleDirective::Render { streak, glyph } => Some(PendingRender {
                chat_id,
                seq: self.render_seq.fetch_add(1, Ordering::SeqCst) + 1,
                streak,
                glyph,
            }),
        }
    }

    // --- Operations ---

    /// A non-command message arrived in `chat_id`.
    pub async fn on_qualifying_message(&self, chat_id: ChatId) -> Result<(), StreakError> {
        let today = self.schedule.today(self.now());
        let render = self
            .store
            .with_lock(|snapshot| {
                self.apply_event(snapshot, chat_id, StreakEvent::QualifyingMessage, today)
            })
            .await?;

        if let Some(render) = render {
            info!(
                "chat {chat_id}: streak confirmed for {today}, now {}",
                render.streak
            );
            self.render_title(render).await;
        }
        Ok(())
    }

    /// Apply an administrative override.
    ///
    /// The live title is fetched first so the stored base title reflects any
    /// manual rename since the last sync. If the fetch fails the stored base
    /// is kept.
    pub async fn on_admin_command(
        &self,
        chat_id: ChatId,
        command: AdminCommand,
    ) -> Result<ChatRecord, StreakError> {
        let live_base = self.fetch_base_title(chat_id).await;
        let today = self.schedule.today(self.now());

        let (record, render) = self
            .store
            .with_lock(|snapshot| {
                if let Some(base) = live_base {
                    snapshot.record_mut(chat_id).base_title = Some(base);
                }
                let render = self.apply_event(snapshot, chat_id, command.event(), today);
                (snapshot.record_mut(chat_id).clone(), render)
            })
            .await?;

        info!(
            "chat {chat_id}: admin {command:?}, streak now {}",
            record.streak
        );
        if let Some(render) = render {
            self.render_title(render).await;
        }
        Ok(record)
    }

    /// Current streak and status. Unknown chats report `(0, idle)`.
    pub async fn query_streak(&self, chat_id: ChatId) -> (u32, Status) {
        self.store
            .get(chat_id)
            .await
            .map(|record| (record.streak, record.status))
            .unwrap_or((0, Status::Idle))
    }

    /// Run a tick immediately, dated by the current wall clock.
    pub async fn force_tick(&self, kind: TickKind) -> Result<TickReport, StreakError> {
        let today = self.schedule.today(self.now());
        self.run_tick(kind, today).await
    }

    /// Apply `kind` to every known chat in one locked section, then fan the
    /// resulting renames out with bounded concurrency.
    pub(super) async fn run_tick(
        &self,
        kind: TickKind,
        today: NaiveDate,
    ) -> Result<TickReport, StreakError> {
        let event = kind.event();
        let (processed, renders) = self
            .store
            .with_lock(|snapshot| {
                let chat_ids = snapshot.chat_ids();
                let renders: Vec<PendingRender> = chat_ids
                    .iter()
                    .filter_map(|&chat_id| self.apply_event(snapshot, chat_id, event, today))
                    .collect();
                (chat_ids.len(), renders)
            })
            .await?;

        let (renamed, failed) = self.render_all(renders).await;
        Ok(TickReport {
            processed,
            renamed,
            failed,
        })
    }

    /// Replay ticks missed while the process was not running.
    ///
    /// Only the last render per chat is applied; earlier ones would be
    /// overwritten immediately.
    pub async fn catch_up(&self) -> Result<TickReport, StreakError> {
        let now = self.now();
        let today = self.schedule.today(now);

        let (processed, renders) = self
            .store
            .with_lock(|snapshot| {
                let mut processed = 0;
                let mut renders = Vec::new();
                for chat_id in snapshot.chat_ids() {
                    let events = match snapshot.chats.get(&chat_id) {
                        Some(record) => self.schedule.catch_up_events(record, now),
                        None => continue,
                    };
                    if events.is_empty() {
                        continue;
                    }
                    debug!("catch-up: chat {chat_id} replays {events:?}");
                    processed += 1;
                    let last = events
                        .into_iter()
                        .filter_map(|event| self.apply_event(snapshot, chat_id, event, today))
                        .last();
                    renders.extend(last);
                }
                (processed, renders)
            })
            .await?;

        let (renamed, failed) = self.render_all(renders).await;
        Ok(TickReport {
            processed,
            renamed,
            failed,
        })
    }

    // --- Title synchronization (outside the store lock) ---

    /// Apply renders concurrently. Returns `(renamed, failed)`.
    async fn render_all(&self, renders: Vec<PendingRender>) -> (usize, usize) {
        stream::iter(renders)
            .map(|render| self.render_title(render))
            .buffer_unordered(self.rename_concurrency)
            .fold((0, 0), |(renamed, failed), outcome| async move {
                match outcome {
                    RenderOutcome::Renamed => (renamed + 1, failed),
                    RenderOutcome::Failed => (renamed, failed + 1),
                    RenderOutcome::Skipped => (renamed, failed),
                }
            })
            .await
    }

    /// Rename a chat to match a committed render.
    ///
    /// Renders for the same chat are serialized; one older than the last
    /// applied render is dropped.
    pub(super) async fn render_title(&self, render: PendingRender) -> RenderOutcome {
        let chat_id = render.chat_id;
        let slot = self.render_slot(chat_id);
        let mut applied = slot.lock().await;
        if render.seq <= *applied {
            debug!("chat {chat_id}: dropping stale title render");
            return RenderOutcome::Skipped;
        }

        let stored_base = self
            .store
            .get(chat_id)
            .await
            .and_then(|record| record.base_title);
        let base = match stored_base {
            Some(base) => base,
            None => match self.capture_base_title(chat_id).await {
                Some(base) => base,
                None => return RenderOutcome::Failed,
            },
        };

        let title = self.codec.compose(&base, render.streak, render.glyph);
        if title.trim().is_empty() {
            warn!("chat {chat_id}: refusing to set an empty title");
            return RenderOutcome::Skipped;
        }

        match self.rename(chat_id, &title).await {
            Ok(()) => {
                *applied = render.seq;
                info!("chat {chat_id}: title set to '{title}'");
                RenderOutcome::Renamed
            }
            Err(e) => {
                warn!("{e}");
                RenderOutcome::Failed
            }
        }
    }

    fn render_slot(&self, chat_id: ChatId) -> Arc<tokio::sync::Mutex<u64>> {
        let mut slots = self
            .applied_renders
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slots.entry(chat_id).or_default().clone()
    }

    /// Set the chat title, bounded by the rename timeout.
    async fn rename(&self, chat_id: ChatId, title: &str) -> Result<(), StreakError> {
        match tokio::time::timeout(
            self.rename_timeout,
            self.channel.set_chat_title(chat_id, title),
        )
        .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e @ StreakError::RenameFailed { .. })) => Err(e),
            Ok(Err(e)) => Err(StreakError::RenameFailed {
                chat_id,
                reason: e.to_string(),
            }),
            Err(_) => Err(StreakError::RenameFailed {
                chat_id,
                reason: format!("timed out after {:?}", self.rename_timeout),
            }),
        }
    }

    /// Read the live title and strip any streak suffix from it.
    /// `None` when the title cannot be fetched or is empty once stripped.
    pub(super) async fn fetch_base_title(&self, chat_id: ChatId) -> Option<String> {
        let fetched =
            tokio::time::timeout(self.rename_timeout, self.channel.chat_title(chat_id)).await;
        match fetched {
            Ok(Ok(title)) => {
                let base = self.codec.strip_suffix(&title);
                if base.is_empty() {
                    warn!("chat {chat_id}: live title '{title}' has no base text");
                    None
                } else {
                    Some(base)
                }
            }
            Ok(Err(e)) => {
                warn!("chat {chat_id}: failed to fetch title: {e}");
                None
            }
            Err(_) => {
                warn!("chat {chat_id}: title fetch timed out");
                None
            }
        }
    }

    /// First render for a chat: derive the base title from the live title
    /// and persist it. A base stored concurrently wins.
    async fn capture_base_title(&self, chat_id: ChatId) -> Option<String> {
        let live = self.fetch_base_title(chat_id).await?;
        let stored = self
            .store
            .with_lock(|snapshot| {
                snapshot
                    .record_mut(chat_id)
                    .base_title
                    .get_or_insert(live)
                    .clone()
            })
            .await;
        match stored {
            Ok(base) => {
                info!("chat {chat_id}: base title captured as '{base}'");
                Some(base)
            }
            Err(e) => {
                warn!("chat {chat_id}: failed to persist base title: {e}");
                None
            }
        }
    }
}
