use anyhow::Result;
use quizbot_core::init_tracing;
use quizbot_telegram::run_repl;
use tracing::{info, instrument};

use crate::components::build_bot_components;
use crate::config::BotConfig;

/// Main entry: validate config, init logging, build components, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        storage_backend = ?config.storage.backend,
        email_api = config.email.api_url.is_some(),
        enforce_code_expiry = config.verification.enforce_code_expiry,
        "Initializing bot"
    );

    let components = build_bot_components(&config, None).await?;

    info!("Bot started successfully");

    run_repl(components.teloxide_bot, components.dispatcher).await
}
