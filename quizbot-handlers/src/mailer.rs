//! Verification email composition on top of [`EmailSender`].

use chrono::{DateTime, Utc};
use email_client::{EmailError, EmailSender, TemplateData};
use std::sync::Arc;
use tracing::info;

pub const VERIFICATION_SUBJECT: &str = "Your Verification Code";

#[derive(Clone)]
pub struct VerificationMailer {
    sender: Arc<dyn EmailSender>,
    login_domain: Option<String>,
}

impl VerificationMailer {
    pub fn new(sender: Arc<dyn EmailSender>, login_domain: Option<String>) -> Self {
        Self {
            sender,
            login_domain: login_domain.filter(|d| !d.trim().is_empty()),
        }
    }

    /// Address the code goes to: the login itself, or `login@domain` for bare logins.
    pub fn recipient(&self, login: &str) -> String {
        match &self.login_domain {
            Some(domain) if !login.contains('@') => {
                format!("{}@{}", login, domain.trim_start_matches('@'))
            }
            _ => login.to_string(),
        }
    }

    /// Sends `code` with a human-readable "expires in" hint. Returns the recipient address.
    pub async fn send_code(
        &self,
        login: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<String, EmailError> {
        let recipient = self.recipient(login);
        let mut data = TemplateData::new();
        data.insert("Login".to_string(), login.to_string());
        data.insert("Code".to_string(), code.to_string());
        data.insert("ExpiresIn".to_string(), expires_in(expires_at, Utc::now()));

        self.sender
            .send(&recipient, VERIFICATION_SUBJECT, &data)
            .await?;
        info!(recipient = %recipient, "step: verification email sent");
        Ok(recipient)
    }
}

/// Whole minutes until `expires_at`, e.g. `"30 minutes"`.
fn expires_in(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (expires_at - now).num_seconds().max(0) as f64 / 60.0;
    format!("{:.0} minutes", minutes)
}
