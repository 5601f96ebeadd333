//! Core types: conversation key, FSM state, chat/user identity, inbound message and update,
//! outbound message, and transport conversion traits.
//!
//! One file per main type.

mod chat;
mod convert;
mod key;
mod message;
mod outgoing;
mod state;
mod user;

pub use chat::Chat;
pub use convert::{ToCoreMessage, ToCoreUser};
pub use key::ConversationKey;
pub use message::{Message, Update};
pub use outgoing::{InlineButton, InlineKeyboard, OutgoingMessage, ParseMode};
pub use state::State;
pub use user::User;
