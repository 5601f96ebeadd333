//! # Quiz bot application
//!
//! Loads config from env, wires the state store, user repository, email sender and handlers into
//! a [`fsm_router::Dispatcher`], and runs the Telegram REPL.

pub mod cli;
pub mod components;
pub mod config;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, create_email_sender, BotComponents};
pub use config::{BaseConfig, BotConfig, EmailConfig, QuizConfig};
pub use runner::run_bot;
