use async_trait::async_trait;
use quizbot_core::{Message, Result};

use crate::context::ConversationContext;

/// Reacts to one message of a conversation. Registered in a [`crate::CommandRouter`] under a
/// command name or in a [`crate::StateRouter`] under a state.
///
/// Replies go out through whatever `Bot` the handler was constructed with; the returned error is
/// only logged by the dispatcher.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()>;
}
