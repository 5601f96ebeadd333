//! # quizbot-core
//!
//! Core types and traits for the quiz bot: [`ConversationKey`], [`State`], inbound [`Message`] /
//! [`Update`], outbound [`OutgoingMessage`], the [`Bot`] send trait, the error taxonomy and
//! tracing initialization. Transport-agnostic; used by fsm-storage, fsm-router, the handlers and
//! quizbot-telegram.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::Bot;
pub use error::{BotError, Result, StorageError};
pub use logger::init_tracing;
pub use types::{
    Chat, ConversationKey, InlineButton, InlineKeyboard, Message, OutgoingMessage, ParseMode,
    State, ToCoreMessage, ToCoreUser, Update, User,
};
