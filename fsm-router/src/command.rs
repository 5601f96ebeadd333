//! Command registry: `/name` → handler. Consulted before state routing.

use quizbot_core::{BotError, Message, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::context::ConversationContext;
use crate::handler::Handler;

/// Immutable once built; share it behind an `Arc`.
#[derive(Clone, Default)]
pub struct CommandRouter {
    handlers: HashMap<String, Arc<dyn Handler>>,
}

impl CommandRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `name`. A leading `/` is accepted and ignored; names are
    /// case-sensitive. Registering the same name twice keeps the last handler.
    pub fn register(mut self, name: &str, handler: Arc<dyn Handler>) -> Self {
        let name = name.strip_prefix('/').unwrap_or(name);
        self.handlers.insert(name.to_string(), handler);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered command names, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Runs the handler registered for the message's command token.
    ///
    /// Unknown commands (and non-command text) return [`BotError::CommandNotFound`] without
    /// touching the conversation.
    #[instrument(skip_all, fields(chat_id = message.chat.id, user_id = message.user.id))]
    pub async fn handle_command(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        let command = message
            .command()
            .ok_or_else(|| BotError::CommandNotFound(message.content.clone()))?;
        let handler = self
            .handlers
            .get(command)
            .ok_or_else(|| BotError::CommandNotFound(command.to_string()))?;

        info!(
            user_id = message.user.id,
            command = %command,
            "step: command handler processing"
        );
        handler.handle(message, ctx).await?;
        info!(
            user_id = message.user.id,
            command = %command,
            "step: command handler done"
        );
        Ok(())
    }
}
