//! Minimal Telegram config: token and optional API URL.
//! Loaded from BOT_TOKEN and TELEGRAM_API_URL (or TELOXIDE_API_URL).

use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub telegram_api_url: Option<String>,
}

impl TelegramConfig {
    /// BOT_TOKEN is required; TELEGRAM_API_URL / TELOXIDE_API_URL is optional.
    pub fn from_env() -> Result<Self> {
        let bot_token = env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?;
        Ok(Self {
            bot_token,
            telegram_api_url: api_url_from_env(),
        })
    }

    /// Uses the given token; the API URL still comes from the environment.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            telegram_api_url: api_url_from_env(),
        }
    }
}

fn api_url_from_env() -> Option<String> {
    env::var("TELEGRAM_API_URL")
        .or_else(|_| env::var("TELOXIDE_API_URL"))
        .ok()
        .filter(|u| !u.is_empty())
}
