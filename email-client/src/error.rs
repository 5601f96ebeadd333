use quizbot_core::BotError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Email API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

impl From<EmailError> for BotError {
    fn from(err: EmailError) -> Self {
        BotError::Email(err.to_string())
    }
}
