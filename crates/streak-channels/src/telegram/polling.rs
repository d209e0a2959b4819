//! Long-polling update loop and Channel trait implementation.

use super::types::{TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use streak_core::{
    error::StreakError,
    message::{ChatEvent, ChatId, IncomingMessage, ServiceEvent, ServiceKind},
    traits::Channel,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<ChatEvent>, StreakError> {
        if self.config.bot_token.is_empty() {
            return Err(StreakError::Config("telegram bot_token is empty".into()));
        }
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(256);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let offset = last.map(|id| id + 1);
                drop(last);

                let mut url =
                    format!("{base_url}/getUpdates?timeout=30&allowed_updates=%5B%22message%22%5D");
                if let Some(off) = offset {
                    url.push_str(&format!("&offset={off}"));
                }

                let resp = match client
                    .get(&url)
                    .timeout(std::time::Duration::from_secs(35))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(std::time::Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(msg) = update.message else {
                        continue;
                    };
                    let Some(event) = classify_message(msg) else {
                        continue;
                    };
                    if tx.send(event).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), StreakError> {
        self.send_html(chat_id, text).await
    }

    async fn chat_title(&self, chat_id: ChatId) -> Result<String, StreakError> {
        let chat = self.get_chat(chat_id).await?;
        chat.title
            .ok_or_else(|| StreakError::Channel(format!("chat {chat_id} has no title")))
    }

    async fn set_chat_title(&self, chat_id: ChatId, title: &str) -> Result<(), StreakError> {
        self.rename(chat_id, title).await
    }

    async fn is_admin(&self, chat_id: ChatId, user_id: i64) -> Result<bool, StreakError> {
        let status = self.member_status(chat_id, user_id).await?;
        Ok(matches!(status.as_str(), "creator" | "administrator"))
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: i64) -> Result<(), StreakError> {
        self.delete(chat_id, message_id).await
    }

    async fn stop(&self) -> Result<(), StreakError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

/// Turn a raw Telegram message into a chat event.
///
/// Only group and supergroup chats are tracked. Messages written by other
/// bots are dropped.
pub(crate) fn classify_message(msg: TgMessage) -> Option<ChatEvent> {
    if !matches!(msg.chat.chat_type.as_str(), "group" | "supergroup") {
        debug!("telegram: ignoring {} chat {}", msg.chat.chat_type, msg.chat.id);
        return None;
    }

    let chat_id = msg.chat.id;
    let service = |kind| {
        Some(ChatEvent::Service(ServiceEvent {
            chat_id,
            message_id: msg.message_id,
            kind,
        }))
    };

    if let Some(title) = msg.new_chat_title.clone() {
        return service(ServiceKind::NewTitle(title));
    }
    if msg.new_chat_photo.is_some() {
        return service(ServiceKind::NewPhoto);
    }
    if msg.delete_chat_photo.unwrap_or(false) {
        return service(ServiceKind::DeletePhoto);
    }
    if msg.left_chat_member.is_some() {
        return service(ServiceKind::MemberLeft);
    }
    if msg.new_chat_members.is_some() {
        return service(ServiceKind::MembersJoined);
    }
    if msg.pinned_message.is_some() {
        return service(ServiceKind::Pinned);
    }
    if msg.group_chat_created.unwrap_or(false)
        || msg.supergroup_chat_created.unwrap_or(false)
        || msg.migrate_from_chat_id.is_some()
    {
        return service(ServiceKind::ChatCreated);
    }

    if msg.from.as_ref().is_some_and(|u| u.is_bot) && msg.sender_chat.is_none() {
        debug!("telegram: ignoring bot message in chat {chat_id}");
        return None;
    }

    let anonymous_admin = msg.sender_chat.as_ref().is_some_and(|c| c.id == chat_id);
    let sender_id = if anonymous_admin {
        None
    } else {
        msg.from.as_ref().map(|u| u.id)
    };
    let sender_name = msg.from.as_ref().map(|u| {
        if let Some(ref un) = u.username {
            format!("@{un}")
        } else if let Some(ref ln) = u.last_name {
            format!("{} {ln}", u.first_name)
        } else {
            u.first_name.clone()
        }
    });
    let timestamp = msg
        .date
        .and_then(|d| Utc.timestamp_opt(d, 0).single())
        .unwrap_or_else(Utc::now);

    Some(ChatEvent::Message(IncomingMessage {
        chat_id,
        message_id: msg.message_id,
        sender_id,
        sender_name,
        text: msg.text.or(msg.caption),
        anonymous_admin,
        timestamp,
    }))
}
