//! Email delivery config. Without EMAIL_API_URL codes are only written to the log.

use anyhow::Result;

use super::env_opt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailConfig {
    /// EMAIL_API_URL
    pub api_url: Option<String>,
    /// EMAIL_API_KEY, sent as a bearer token
    pub api_key: Option<String>,
    /// EMAIL_FROM
    pub from: Option<String>,
    /// EMAIL_LOGIN_DOMAIN, appended to logins without `@`
    pub login_domain: Option<String>,
}

impl EmailConfig {
    pub fn from_env() -> Self {
        Self {
            api_url: env_opt("EMAIL_API_URL"),
            api_key: env_opt("EMAIL_API_KEY"),
            from: env_opt("EMAIL_FROM"),
            login_domain: env_opt("EMAIL_LOGIN_DOMAIN").map(|d| d.trim_start_matches('@').to_string()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(ref url) = self.api_url {
            if reqwest::Url::parse(url).is_err() {
                anyhow::bail!("EMAIL_API_URL is not a valid URL: {}", url);
            }
            if self.from.is_none() {
                anyhow::bail!("EMAIL_FROM is required when EMAIL_API_URL is set");
            }
        }
        Ok(())
    }
}
