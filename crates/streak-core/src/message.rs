use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Platform chat identifier (Telegram chat ids are signed 64-bit).
pub type ChatId = i64;

/// Anything a channel can report about a tracked chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ChatEvent {
    /// A regular user message (text, media, sticker, ...).
    Message(IncomingMessage),
    /// A service/administrative event generated by the platform.
    Service(ServiceEvent),
}

impl ChatEvent {
    pub fn chat_id(&self) -> ChatId {
        match self {
            Self::Message(m) => m.chat_id,
            Self::Service(s) => s.chat_id,
        }
    }
}

/// A regular message from a group chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub message_id: i64,
    /// Platform user id of the author, absent for anonymous admins and channels.
    pub sender_id: Option<i64>,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Text or caption, if any.
    pub text: Option<String>,
    /// Posted on behalf of the group itself (an anonymous administrator).
    #[serde(default)]
    pub anonymous_admin: bool,
    pub timestamp: DateTime<Utc>,
}

/// A platform-generated service message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub kind: ServiceKind,
}

/// Service message kinds that are reported to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceKind {
    /// The chat title changed (by anyone, including this bot).
    NewTitle(String),
    NewPhoto,
    DeletePhoto,
    MemberLeft,
    MembersJoined,
    Pinned,
    /// Group or supergroup was created (or migrated).
    ChatCreated,
}
