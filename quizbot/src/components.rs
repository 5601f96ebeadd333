//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use email_client::{EmailSender, HttpEmailSender, LogEmailSender};
use fsm_router::Dispatcher;
use fsm_storage::{build_state_store, StateStore};
use quizbot_core::Bot;
use quizbot_handlers::{
    build_command_router, build_state_router, HandlerComponents, RandomOtpGenerator,
};
use quizbot_telegram::{build_teloxide_bot, TelegramBotAdapter, TelegramConfig};
use std::sync::Arc;
use tracing::{error, info, instrument};
use user_storage::{SqliteUserRepository, UserRepository};

use crate::config::{BotConfig, EmailConfig};

/// Everything run_bot needs; produced by the component factory.
#[derive(Clone)]
pub struct BotComponents {
    pub teloxide_bot: teloxide::Bot,
    pub store: Arc<dyn StateStore>,
    pub users: Arc<dyn UserRepository>,
    pub handlers: HandlerComponents,
    pub dispatcher: Dispatcher,
}

/// HTTP sender when EMAIL_API_URL is set, otherwise one that only logs.
pub fn create_email_sender(config: &EmailConfig) -> Result<Arc<dyn EmailSender>> {
    match &config.api_url {
        Some(api_url) => {
            let from = config
                .from
                .clone()
                .ok_or_else(|| anyhow::anyhow!("EMAIL_FROM is required when EMAIL_API_URL is set"))?;
            info!(api_url = %api_url, from = %from, "Using HTTP email sender");
            Ok(Arc::new(HttpEmailSender::new(
                api_url.clone(),
                config.api_key.clone(),
                from,
            )?))
        }
        None => {
            info!("EMAIL_API_URL not set, verification codes will only be logged");
            Ok(Arc::new(LogEmailSender))
        }
    }
}

/// Builds the state store, user repository, handlers and dispatcher.
///
/// When `handler_bot_override` is `Some`, handlers reply through it instead of Telegram (tests).
#[instrument(skip(config, handler_bot_override))]
pub async fn build_bot_components(
    config: &BotConfig,
    handler_bot_override: Option<Arc<dyn Bot>>,
) -> Result<BotComponents> {
    let store = build_state_store(&config.storage).await.map_err(|e| {
        error!(error = %e, backend = ?config.storage.backend, "Failed to initialize state store");
        anyhow::anyhow!("Failed to initialize state store: {}", e)
    })?;

    let users: Arc<dyn UserRepository> = Arc::new(
        SqliteUserRepository::new(config.database_url())
            .await
            .map_err(|e| {
                error!(
                    error = %e,
                    database_url = %config.database_url(),
                    "Failed to initialize user storage"
                );
                anyhow::anyhow!("Failed to initialize user storage: {}", e)
            })?,
    );

    let teloxide_bot = build_teloxide_bot(&TelegramConfig {
        bot_token: config.base.bot_token.clone(),
        telegram_api_url: config.base.telegram_api_url.clone(),
    });
    let bot: Arc<dyn Bot> = match handler_bot_override {
        Some(bot) => bot,
        None => Arc::new(TelegramBotAdapter::new(teloxide_bot.clone())),
    };

    let handlers = HandlerComponents {
        bot,
        users: users.clone(),
        email: create_email_sender(&config.email)?,
        otp: Arc::new(RandomOtpGenerator::new(config.verification.code_length)),
        verification: config.verification.clone(),
        quiz_web_app_url: config.quiz.web_app_url.clone(),
    };

    let commands = build_command_router(&handlers);
    info!(commands = ?commands.commands(), "Command router built");
    let dispatcher = Dispatcher::with_idle_timeout(
        store.clone(),
        Arc::new(commands),
        Arc::new(build_state_router(&handlers)),
        config.dispatch_idle_timeout,
    );

    Ok(BotComponents {
        teloxide_bot,
        store,
        users,
        handlers,
        dispatcher,
    })
}
