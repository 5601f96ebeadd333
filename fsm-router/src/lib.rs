//! # FSM router
//!
//! Routes each inbound message of a conversation to a handler: slash commands through
//! [`CommandRouter`], everything else through [`StateRouter`] keyed by the conversation's current
//! state. [`Dispatcher`] feeds both and serializes messages of the same conversation.

mod command;
mod context;
mod dispatcher;
mod handler;
mod state;

pub use command::CommandRouter;
pub use context::ConversationContext;
pub use dispatcher::{Dispatcher, DEFAULT_IDLE_TIMEOUT};
pub use handler::Handler;
pub use state::StateRouter;
