//! Conversation key: (chat, user) pair identifying one in-flight conversation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one conversation: the same user in two chats has two independent conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConversationKey {
    pub chat_id: i64,
    pub user_id: i64,
}

impl ConversationKey {
    pub const fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

/// Formats as `<chat>:<user>`, the suffix used by storage key layouts.
impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_chat_then_user() {
        assert_eq!(ConversationKey::new(-100123, 42).to_string(), "-100123:42");
    }

    #[test]
    fn test_same_user_different_chat_is_different_key() {
        assert_ne!(ConversationKey::new(1, 7), ConversationKey::new(2, 7));
    }
}
