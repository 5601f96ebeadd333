//! State registry: exact state → handler.

use quizbot_core::{BotError, Message, Result, State};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::context::ConversationContext;
use crate::handler::Handler;

/// Dispatches on the conversation's current state. Matching is exact; the default state needs its
/// own registration like any other. Immutable once built.
#[derive(Clone, Default)]
pub struct StateRouter {
    handlers: HashMap<State, Arc<dyn Handler>>,
}

impl StateRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, state: State, handler: Arc<dyn Handler>) -> Self {
        self.handlers.insert(state, handler);
        self
    }

    pub fn contains(&self, state: &State) -> bool {
        self.handlers.contains_key(state)
    }

    /// Reads the current state and runs its handler, or fails with
    /// [`BotError::NoHandlerForState`].
    #[instrument(skip_all, fields(chat_id = message.chat.id, user_id = message.user.id))]
    pub async fn process_update(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        let state = ctx.current().await?;
        let handler = self
            .handlers
            .get(&state)
            .ok_or_else(|| BotError::NoHandlerForState(state.clone()))?;

        info!(
            user_id = message.user.id,
            state = %state,
            "step: state handler processing"
        );
        handler.handle(message, ctx).await?;
        info!(
            user_id = message.user.id,
            state = %state,
            "step: state handler done"
        );
        Ok(())
    }
}
