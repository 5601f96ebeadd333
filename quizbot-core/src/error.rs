//! Error types for the bot core.
//!
//! [`BotError`] is the top-level error returned by routers and handlers; [`StorageError`] is what
//! state stores return and converts into `BotError::Storage`.

use thiserror::Error;

use crate::types::State;

/// Errors raised by a state store backend. Never retried internally; callers decide.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend unreachable or rejected the command.
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Value could not be encoded to / decoded from JSON.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A scratch entry exists but does not decode into the requested type.
    #[error("Type mismatch for field '{field}': {reason}")]
    TypeMismatch { field: String, reason: String },
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Top-level error for dispatch, routing and handlers.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("No handler for state: {0}")]
    NoHandlerForState(State),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Email error: {0}")]
    Email(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("OTP generation error: {0}")]
    Otp(String),

    #[error("Config error: {0}")]
    Config(String),

    /// The conversation worker stopped before reporting a result.
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

/// Result type for core operations; uses [`BotError`].
pub type Result<T> = std::result::Result<T, BotError>;
