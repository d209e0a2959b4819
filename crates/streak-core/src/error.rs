use thiserror::Error;

/// Top-level error type for streak.
#[derive(Debug, Error)]
pub enum StreakError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Error from a messaging channel.
    #[error("channel error: {0}")]
    Channel(String),

    /// A chat title could not be changed (missing rights, rate limit, timeout).
    #[error("rename failed for chat {chat_id}: {reason}")]
    RenameFailed { chat_id: i64, reason: String },

    /// Persisted state could not be read or parsed.
    #[error("store corrupt: {0}")]
    StoreCorrupt(String),

    /// Persisted state could not be written.
    #[error("store error: {0}")]
    Store(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
