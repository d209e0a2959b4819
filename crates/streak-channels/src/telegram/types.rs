//! Telegram Bot API deserialization types.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Option<TgResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponseParameters {
    /// Seconds to wait before retrying after a flood-control error.
    pub retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    /// Set when the message was sent on behalf of a chat (anonymous admin).
    pub sender_chat: Option<TgChat>,
    pub chat: TgChat,
    pub date: Option<i64>,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub new_chat_title: Option<String>,
    pub new_chat_photo: Option<serde_json::Value>,
    pub delete_chat_photo: Option<bool>,
    pub left_chat_member: Option<TgUser>,
    pub new_chat_members: Option<Vec<TgUser>>,
    pub pinned_message: Option<serde_json::Value>,
    pub group_chat_created: Option<bool>,
    pub supergroup_chat_created: Option<bool>,
    pub migrate_from_chat_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgChatMember {
    /// "creator", "administrator", "member", "restricted", "left" or "kicked".
    pub status: String,
}
