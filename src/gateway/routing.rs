//! Event routing: commands, service messages, and qualifying activity.

use super::{AdminCommand, Gateway};
use crate::commands::Command;
use crate::i18n::{self, t};
use streak_core::message::{ChatEvent, ChatId, IncomingMessage, ServiceEvent, ServiceKind};
use tracing::{debug, error, info, warn};

impl Gateway {
    /// Route one inbound event.
    pub(super) async fn dispatch_event(&self, event: ChatEvent) {
        match event {
            ChatEvent::Message(message) => self.handle_message(message).await,
            ChatEvent::Service(service) => self.handle_service(service).await,
        }
    }

    async fn handle_message(&self, message: IncomingMessage) {
        // Recognized commands never count as activity.
        if let Some(cmd) = message.text.as_deref().and_then(Command::parse) {
            self.handle_command(cmd, &message).await;
            return;
        }

        if let Err(e) = self.on_qualifying_message(message.chat_id).await {
            error!(
                "chat {}: failed to record activity: {e}",
                message.chat_id
            );
        }
    }

    async fn handle_command(&self, cmd: Command, message: &IncomingMessage) {
        let chat_id = message.chat_id;
        let lang = self.chat_language(chat_id).await;
        info!(
            "chat {chat_id}: command {cmd:?} from {}",
            message.sender_name.as_deref().unwrap_or("unknown")
        );

        if cmd.requires_admin() && !self.sender_is_admin(message).await {
            self.reply(chat_id, t("admin_only", &lang)).await;
            return;
        }

        let response = match cmd {
            Command::Help => t("help", &lang).to_string(),
            Command::Streak => {
                let (streak, status) = self.query_streak(chat_id).await;
                i18n::streak_show(&lang, streak, status)
            }
            Command::Set(None) => t("set_usage", &lang).to_string(),
            Command::Set(Some(value)) => {
                match self.on_admin_command(chat_id, AdminCommand::Set(value)).await {
                    Ok(_) => i18n::streak_set(&lang, value),
                    Err(e) => {
                        error!("chat {chat_id}: /set failed: {e}");
                        t("command_failed", &lang).to_string()
                    }
                }
            }
            Command::Reset => match self.on_admin_command(chat_id, AdminCommand::Reset).await {
                Ok(_) => t("streak_reset", &lang).to_string(),
                Err(e) => {
                    error!("chat {chat_id}: /reset failed: {e}");
                    t("command_failed", &lang).to_string()
                }
            },
            Command::ToggleDeletes => {
                let toggled = self
                    .store
                    .with_lock(|snapshot| {
                        snapshot.delete_service_messages = !snapshot.delete_service_messages;
                        snapshot.delete_service_messages
                    })
                    .await;
                match toggled {
                    Ok(true) => t("deletes_on", &lang).to_string(),
                    Ok(false) => t("deletes_off", &lang).to_string(),
                    Err(e) => {
                        error!("chat {chat_id}: /toggle_deletes failed: {e}");
                        t("command_failed", &lang).to_string()
                    }
                }
            }
            Command::Lang(Some(code)) if i18n::is_supported(&code) => {
                let stored = self
                    .store
                    .with_lock(|snapshot| {
                        snapshot.record_mut(chat_id).language = Some(code.clone());
                    })
                    .await;
                match stored {
                    Ok(()) => t("language_set", &code).to_string(),
                    Err(e) => {
                        error!("chat {chat_id}: /lang failed: {e}");
                        t("command_failed", &lang).to_string()
                    }
                }
            }
            Command::Lang(_) => t("lang_usage", &lang).to_string(),
        };

        self.reply(chat_id, &response).await;
    }

    /// Service messages register the chat, track manual renames, and are
    /// deleted when cleanup is enabled.
    async fn handle_service(&self, service: ServiceEvent) {
        let chat_id = service.chat_id;
        let new_base = match &service.kind {
            ServiceKind::NewTitle(title) => {
                Some(self.codec.strip_suffix(title)).filter(|base| !base.is_empty())
            }
            _ => None,
        };

        let delete = self
            .store
            .with_lock(|snapshot| {
                let record = snapshot.record_mut(chat_id);
                if let Some(base) = new_base {
                    if record.base_title.as_deref() != Some(base.as_str()) {
                        info!("chat {chat_id}: base title is now '{base}'");
                        record.base_title = Some(base);
                    }
                }
                snapshot.delete_service_messages
            })
            .await;

        match delete {
            Ok(true) => {
                if let Err(e) = self
                    .channel
                    .delete_message(chat_id, service.message_id)
                    .await
                {
                    warn!("chat {chat_id}: failed to delete service message: {e}");
                }
            }
            Ok(false) => debug!("chat {chat_id}: keeping {:?} service message", service.kind),
            Err(e) => error!("chat {chat_id}: failed to record service event: {e}"),
        }
    }

    /// Anonymous admins post as the chat itself; anyone else is checked
    /// against the platform's member list. Lookup failures deny.
    async fn sender_is_admin(&self, message: &IncomingMessage) -> bool {
        if message.anonymous_admin {
            return true;
        }
        let Some(user_id) = message.sender_id else {
            return false;
        };
        match self.channel.is_admin(message.chat_id, user_id).await {
            Ok(is_admin) => is_admin,
            Err(e) => {
                warn!(
                    "chat {}: admin check for {user_id} failed: {e}",
                    message.chat_id
                );
                false
            }
        }
    }

    /// Language picked with `/lang`, or the configured default.
    async fn chat_language(&self, chat_id: ChatId) -> String {
        self.store
            .get(chat_id)
            .await
            .and_then(|record| record.language)
            .unwrap_or_else(|| self.default_language.clone())
    }

    async fn reply(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.channel.send_text(chat_id, text).await {
            warn!("chat {chat_id}: failed to send reply: {e}");
        }
    }
}
