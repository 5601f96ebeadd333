//! # quizbot-telegram
//!
//! Telegram layer: adapters to core types, [`quizbot_core::Bot`] implementation, minimal config,
//! REPL runner feeding a [`fsm_router::Dispatcher`]. No state or verification logic lives here.

mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use runner::{build_teloxide_bot, run_repl};
