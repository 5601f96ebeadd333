//! Bot configuration: BaseConfig (Telegram + log + DB) plus the state store, email, verification
//! and quiz sections, each loaded from env.

mod base;
mod bot_config;
mod email;
mod verification;


pub use base::BaseConfig;
pub use bot_config::{BotConfig, QuizConfig};
pub use email::EmailConfig;
pub use verification::verification_from_env;

/// Parses an env var, falling back to `default` when unset or unparsable.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Non-empty env var, trimmed.
pub(crate) fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
