use crate::{
    error::StreakError,
    message::{ChatEvent, ChatId},
};
use async_trait::async_trait;

/// Messaging Channel trait: inbound events and the outbound chat actions
/// the streak gateway needs.
///
/// Every messaging platform implements this trait. Everything except
/// `start` may fail transiently; callers treat failures as recoverable.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Start listening for chat events.
    /// Returns a receiver that yields incoming events.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<ChatEvent>, StreakError>;

    /// Send a text reply to a chat.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<(), StreakError>;

    /// Fetch the live display title of a chat.
    async fn chat_title(&self, chat_id: ChatId) -> Result<String, StreakError>;

    /// Rename a chat.
    async fn set_chat_title(&self, chat_id: ChatId, title: &str) -> Result<(), StreakError>;

    /// Whether `user_id` administers `chat_id`.
    async fn is_admin(&self, chat_id: ChatId, user_id: i64) -> Result<bool, StreakError>;

    /// Delete a message (used for service message cleanup).
    async fn delete_message(&self, _chat_id: ChatId, _message_id: i64) -> Result<(), StreakError> {
        Ok(())
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), StreakError>;
}
