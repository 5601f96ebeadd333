//! Repository error type.

use quizbot_core::BotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Invalid user: {0}")]
    Invalid(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}

impl From<RepositoryError> for BotError {
    fn from(err: RepositoryError) -> Self {
        BotError::Repository(err.to_string())
    }
}
