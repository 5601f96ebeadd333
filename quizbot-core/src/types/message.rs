//! Inbound message and update types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, key::ConversationKey, user::User};

/// A single inbound text message from a chat participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The conversation this message belongs to: (chat, sender).
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(self.chat.id, self.user.id)
    }

    /// True when the text starts with `/` followed by a non-empty command token.
    pub fn is_command(&self) -> bool {
        self.command().is_some()
    }

    /// Command token without the leading `/` and without an `@botname` suffix.
    ///
    /// `"/register@quiz_bot now"` yields `Some("register")`; plain text yields `None`.
    pub fn command(&self) -> Option<&str> {
        let rest = self.content.strip_prefix('/')?;
        let token = rest.split(char::is_whitespace).next().unwrap_or("");
        let token = token.split('@').next().unwrap_or("");
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }
}

/// One inbound transport update. Updates without a user text message (edits, channel posts,
/// service messages) carry `message: None` and are skipped by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub id: String,
    pub message: Option<Message>,
}

impl Update {
    pub fn from_message(message: Message) -> Self {
        Self {
            id: message.id.clone(),
            message: Some(message),
        }
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: None,
        }
    }
}
