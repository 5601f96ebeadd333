//! REPL runner: feeds every Telegram message into the dispatcher.

use anyhow::Result;
use fsm_router::Dispatcher;
use teloxide::prelude::*;
use tracing::{error, info};

use crate::adapters::TelegramMessageWrapper;
use crate::config::TelegramConfig;

/// Creates a teloxide Bot, pointing it at a custom API URL when configured.
pub fn build_teloxide_bot(config: &TelegramConfig) -> Bot {
    let bot = Bot::new(config.bot_token.clone());
    match &config.telegram_api_url {
        Some(url_str) => match reqwest::Url::parse(url_str) {
            Ok(url) => bot.set_api_url(url),
            Err(e) => {
                error!(error = %e, url = %url_str, "Invalid TELEGRAM_API_URL, using default");
                bot
            }
        },
        None => bot,
    }
}

/// Runs the long-polling REPL until shutdown. Each message is queued on its conversation's worker,
/// so the REPL handler returns immediately.
pub async fn run_repl(bot: Bot, dispatcher: Dispatcher) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(
            username = ?me.user.username,
            "Bot identity confirmed before repl"
        ),
        Err(e) => error!(error = %e, "getMe failed; continuing"),
    }

    teloxide::repl(bot, move |msg: Message| {
        let dispatcher = dispatcher.clone();
        async move {
            let update = TelegramMessageWrapper(&msg).to_update();
            match &update.message {
                Some(message) => info!(
                    user_id = message.user.id,
                    chat_id = message.chat.id,
                    message_id = %message.id,
                    "Received message"
                ),
                None => info!(chat_id = msg.chat.id.0, "Received non-text message, skipped"),
            }
            dispatcher.dispatch(update);
            respond(())
        }
    })
    .await;

    Ok(())
}
