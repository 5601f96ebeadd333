//! BotConfig: BaseConfig plus the per-concern sections. Use load() for env-based loading.

use anyhow::Result;
use fsm_storage::StorageConfig;
use quizbot_handlers::VerificationConfig;
use std::time::Duration;

use super::{env_opt, env_or, verification_from_env, BaseConfig, EmailConfig};

/// QUIZ_WEB_APP_URL; `None` makes `/quiz` reply that the quiz is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizConfig {
    pub web_app_url: Option<String>,
}

/// Full bot config. Call validate() after load() to fail fast before init.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub email: EmailConfig,
    pub verification: VerificationConfig,
    pub quiz: QuizConfig,
    /// DISPATCH_IDLE_TIMEOUT_SECS
    pub dispatch_idle_timeout: Duration,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let storage = StorageConfig::from_env()?;
        let email = EmailConfig::from_env();
        let verification = VerificationConfig {
            login_domain: email.login_domain.clone(),
            ..verification_from_env()
        };
        let quiz = QuizConfig {
            web_app_url: env_opt("QUIZ_WEB_APP_URL"),
        };
        let dispatch_idle_timeout = Duration::from_secs(env_or(
            "DISPATCH_IDLE_TIMEOUT_SECS",
            fsm_router::DEFAULT_IDLE_TIMEOUT.as_secs(),
        ));

        Ok(Self {
            base,
            storage,
            email,
            verification,
            quiz,
            dispatch_idle_timeout,
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        self.storage.validate()?;
        self.email.validate()?;
        if self.verification.code_length == 0 {
            anyhow::bail!("OTP_LENGTH must be greater than zero");
        }
        if self.verification.code_validity.is_zero() {
            anyhow::bail!("OTP_VALIDITY_MINUTES must be greater than zero");
        }
        if let Some(ref url) = self.quiz.web_app_url {
            match reqwest::Url::parse(url) {
                Ok(parsed) if parsed.scheme() == "https" => {}
                _ => anyhow::bail!("QUIZ_WEB_APP_URL must be an https URL: {}", url),
            }
        }
        if self.dispatch_idle_timeout.is_zero() {
            anyhow::bail!("DISPATCH_IDLE_TIMEOUT_SECS must be greater than zero");
        }
        Ok(())
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
}
