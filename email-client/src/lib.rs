//! # Email client
//!
//! [`EmailSender`] delivers a templated email: recipient, subject and a map of template variables.
//!
//! - [`HttpEmailSender`] – POSTs JSON to a transactional email API
//! - [`LogEmailSender`] – writes the email to the log instead of sending it (development)

mod error;
mod http;
mod log_sender;

pub use error::EmailError;
pub use http::HttpEmailSender;
pub use log_sender::LogEmailSender;

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Template variables, e.g. `Login`, `Code`, `ExpiresIn`.
pub type TemplateData = BTreeMap<String, String>;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        data: &TemplateData,
    ) -> Result<(), EmailError>;
}
