//! Email delivery through an HTTP JSON API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, instrument};

use crate::error::EmailError;
use crate::{EmailSender, TemplateData};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Sends each email as one `POST <api_url>` with a JSON body
/// `{from, to, subject, text, data}` and an optional bearer token.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
    data: &'a TemplateData,
}

impl HttpEmailSender {
    pub fn new(
        api_url: impl Into<String>,
        api_key: Option<String>,
        from: impl Into<String>,
    ) -> Result<Self, EmailError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            from: from.into(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// Plain-text fallback body: one `Key: value` line per template variable.
fn render_text(data: &TemplateData) -> String {
    data.iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    #[instrument(skip(self, data))]
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        data: &TemplateData,
    ) -> Result<(), EmailError> {
        if recipient.trim().is_empty() {
            return Err(EmailError::InvalidRecipient(recipient.to_string()));
        }

        let request = SendRequest {
            from: &self.from,
            to: recipient,
            subject,
            text: render_text(data),
            data,
        };

        let mut builder = self.client.post(&self.api_url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Api { status, body });
        }

        info!(recipient = %recipient, "step: email accepted by API");
        Ok(())
    }
}
