//! Bot abstraction for sending replies.
//!
//! [`Bot`] is transport-agnostic; quizbot-telegram implements it via teloxide and tests substitute
//! recording implementations.

use crate::error::Result;
use crate::types::OutgoingMessage;
use async_trait::async_trait;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends one message (text, optional parse mode, optional inline keyboard).
    async fn send(&self, message: OutgoingMessage) -> Result<()>;

    /// Sends a plain text message to the given chat.
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send(OutgoingMessage::text(chat_id, text)).await
    }
}
