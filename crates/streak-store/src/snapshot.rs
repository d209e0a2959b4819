//! The persisted snapshot layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use streak_core::{message::ChatId, streak::ChatRecord};

/// Full persisted state: every tracked chat plus process-wide toggles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub chats: BTreeMap<ChatId, ChatRecord>,
    /// Whether service messages (title changes, joins, pins) are deleted.
    #[serde(default = "default_true")]
    pub delete_service_messages: bool,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            chats: BTreeMap::new(),
            delete_service_messages: true,
        }
    }
}

impl Snapshot {
    /// Get a chat's record, creating it with defaults if unseen.
    pub fn record_mut(&mut self, chat_id: ChatId) -> &mut ChatRecord {
        self.chats.entry(chat_id).or_default()
    }

    pub fn chat_ids(&self) -> Vec<ChatId> {
        self.chats.keys().copied().collect()
    }
}

fn default_true() -> bool {
    true
}
