//! Adapters from Telegram (teloxide) types to quizbot_core types.

use quizbot_core::{Chat, Message, ToCoreMessage, ToCoreUser, Update, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`] / [`Update`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: self.0.text().unwrap_or("").to_string(),
            created_at: self.0.date,
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    /// Update for the dispatcher. Only text messages from a human sender carry a message;
    /// service messages, media without text and bot senders become empty updates.
    pub fn to_update(&self) -> Update {
        let from_human = self.0.from.as_ref().is_some_and(|u| !u.is_bot);
        if from_human && self.0.text().is_some() {
            Update::from_message(self.to_core())
        } else {
            Update::empty(self.0.id.to_string())
        }
    }

    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else {
            "channel"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn telegram_message(value: serde_json::Value) -> teloxide::types::Message {
        serde_json::from_value(value).expect("valid Telegram message JSON")
    }

    /// **Test: TelegramUserWrapper converts teloxide User to core User with correct id, username, first_name, last_name.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user: teloxide::types::User = serde_json::from_value(json!({
            "id": 123,
            "is_bot": false,
            "first_name": "Test",
            "last_name": "User",
            "username": "testuser",
            "language_code": "en"
        }))
        .unwrap();

        let core_user = TelegramUserWrapper(&user).to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
    }

    /// **Test: A private text message becomes an update keyed by (chat, sender).**
    #[test]
    fn test_text_message_to_update() {
        let msg = telegram_message(json!({
            "message_id": 7,
            "date": 1_700_000_000,
            "chat": {"id": 456, "type": "private", "first_name": "Test"},
            "from": {"id": 123, "is_bot": false, "first_name": "Test"},
            "text": "/register@quiz_bot"
        }));

        let update = TelegramMessageWrapper(&msg).to_update();
        let message = update.message.expect("text message must produce a message");
        assert_eq!(update.id, "7");
        assert_eq!(message.chat.chat_type, "private");
        assert_eq!(message.conversation_key().chat_id, 456);
        assert_eq!(message.conversation_key().user_id, 123);
        assert_eq!(message.command(), Some("register"));
        assert_eq!(message.created_at.timestamp(), 1_700_000_000);
    }

    /// **Test: Messages without text or from bots are skipped.**
    #[test]
    fn test_non_text_and_bot_messages_are_empty_updates() {
        let sticker_like = telegram_message(json!({
            "message_id": 8,
            "date": 1_700_000_000,
            "chat": {"id": -100, "type": "supergroup", "title": "Quiz"},
            "from": {"id": 123, "is_bot": false, "first_name": "Test"},
            "new_chat_title": "Quiz night"
        }));
        assert!(TelegramMessageWrapper(&sticker_like).to_update().message.is_none());

        let from_bot = telegram_message(json!({
            "message_id": 9,
            "date": 1_700_000_000,
            "chat": {"id": 456, "type": "private", "first_name": "Test"},
            "from": {"id": 999, "is_bot": true, "first_name": "OtherBot"},
            "text": "hello"
        }));
        assert!(TelegramMessageWrapper(&from_bot).to_update().message.is_none());
    }
}
