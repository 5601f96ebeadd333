use async_trait::async_trait;
use tracing::warn;

use crate::error::EmailError;
use crate::{EmailSender, TemplateData};

/// Writes emails to the log instead of delivering them. Used when no email API is configured.
#[derive(Debug, Clone, Default)]
pub struct LogEmailSender;

#[async_trait]
impl EmailSender for LogEmailSender {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        data: &TemplateData,
    ) -> Result<(), EmailError> {
        warn!(
            recipient = %recipient,
            subject = %subject,
            data = ?data,
            "email not delivered (no EMAIL_API_URL configured)"
        );
        Ok(())
    }
}
