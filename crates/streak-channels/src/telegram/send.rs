//! Outbound Bot API calls: replies, title changes, lookups, command registration.

use super::types::{TgChat, TgChatMember, TgResponse};
use super::TelegramChannel;
use serde::de::DeserializeOwned;
use streak_core::error::StreakError;
use tracing::{info, warn};

/// Telegram rejects longer messages.
const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// POST a Bot API method and unwrap the `{ok, result}` envelope.
    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, StreakError> {
        let url = format!("{}/{method}", self.base_url);
        let resp: TgResponse<T> = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StreakError::Channel(format!("telegram {method} failed: {e}")))?
            .json()
            .await
            .map_err(|e| StreakError::Channel(format!("telegram {method} parse failed: {e}")))?;

        if !resp.ok {
            let mut reason = resp.description.unwrap_or_else(|| "unknown error".into());
            if let Some(secs) = resp.parameters.and_then(|p| p.retry_after) {
                reason.push_str(&format!(" (retry after {secs}s)"));
            }
            return Err(StreakError::Channel(format!("telegram {method}: {reason}")));
        }

        resp.result
            .ok_or_else(|| StreakError::Channel(format!("telegram {method} returned no result")))
    }

    /// Send an HTML-formatted text message to a chat.
    pub(crate) async fn send_html(&self, chat_id: i64, text: &str) -> Result<(), StreakError> {
        let text: String = text.chars().take(MAX_MESSAGE_LEN).collect();
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        match self.call::<serde_json::Value>("sendMessage", body).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("can't parse entities") => {
                warn!("HTML parse failed, retrying as plain text: {e}");
                let plain = serde_json::json!({ "chat_id": chat_id, "text": text });
                self.call::<serde_json::Value>("sendMessage", plain)
                    .await
                    .map(|_| ())
            }
            Err(e) => Err(e),
        }
    }

    pub(crate) async fn get_chat(&self, chat_id: i64) -> Result<TgChat, StreakError> {
        self.call("getChat", serde_json::json!({ "chat_id": chat_id }))
            .await
    }

    pub(crate) async fn rename(&self, chat_id: i64, title: &str) -> Result<(), StreakError> {
        let body = serde_json::json!({ "chat_id": chat_id, "title": title });
        match self.call::<bool>("setChatTitle", body).await {
            Ok(_) => Ok(()),
            // Renaming to the current title is not a failure.
            Err(e) if e.to_string().contains("not modified") => Ok(()),
            Err(e) => Err(StreakError::RenameFailed {
                chat_id,
                reason: e.to_string(),
            }),
        }
    }

    pub(crate) async fn member_status(
        &self,
        chat_id: i64,
        user_id: i64,
    ) -> Result<String, StreakError> {
        let body = serde_json::json!({ "chat_id": chat_id, "user_id": user_id });
        let member: TgChatMember = self.call("getChatMember", body).await?;
        Ok(member.status)
    }

    pub(crate) async fn delete(&self, chat_id: i64, message_id: i64) -> Result<(), StreakError> {
        let body = serde_json::json!({ "chat_id": chat_id, "message_id": message_id });
        self.call::<bool>("deleteMessage", body).await.map(|_| ())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "help", "description": "Show available commands" },
                { "command": "streak", "description": "Show the current streak" },
                { "command": "set", "description": "Set the streak (admins)" },
                { "command": "reset", "description": "Reset the streak (admins)" },
                { "command": "toggle_deletes", "description": "Toggle service message cleanup (admins)" },
                { "command": "lang", "description": "Set the reply language: ru, ua, en (admins)" },
            ],
            "scope": { "type": "all_group_chats" },
        });

        match self.call::<bool>("setMyCommands", commands).await {
            Ok(_) => info!("registered Telegram bot commands"),
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }
}
