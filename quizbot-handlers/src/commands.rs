//! Slash commands.

use async_trait::async_trait;
use fsm_router::{ConversationContext, Handler};
use quizbot_core::{Bot, InlineButton, InlineKeyboard, Message, OutgoingMessage, Result};
use std::sync::Arc;
use tracing::info;

use crate::reply::reply;
use crate::states;

pub const WELCOME_TEXT: &str = "👋 Welcome! Please register by sending the /register command.";
pub const LOGIN_PROMPT: &str = "🔑 Please enter your login to register.";
pub const QUIZ_TEXT: &str = "Tap the button below to launch the quiz app.";
pub const QUIZ_UNAVAILABLE: &str = "The quiz is not available right now.";
pub const CANCELLED_TEXT: &str = "Cancelled. Send /register to start over.";

/// `/start` and `/help`.
pub struct StartCommand {
    bot: Arc<dyn Bot>,
}

impl StartCommand {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for StartCommand {
    async fn handle(&self, message: &Message, _ctx: &ConversationContext) -> Result<()> {
        reply(self.bot.as_ref(), message, WELCOME_TEXT).await
    }
}

/// `/register`: restarts verification from any state.
pub struct RegisterCommand {
    bot: Arc<dyn Bot>,
}

impl RegisterCommand {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for RegisterCommand {
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        ctx.set(&states::AWAITING_LOGIN).await?;
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            "step: registration started"
        );
        reply(self.bot.as_ref(), message, LOGIN_PROMPT).await
    }
}

/// `/quiz`: inline keyboard with a web-app button.
pub struct QuizCommand {
    bot: Arc<dyn Bot>,
    web_app_url: Option<String>,
}

impl QuizCommand {
    pub fn new(bot: Arc<dyn Bot>, web_app_url: Option<String>) -> Self {
        Self {
            bot,
            web_app_url: web_app_url.filter(|u| !u.trim().is_empty()),
        }
    }
}

#[async_trait]
impl Handler for QuizCommand {
    async fn handle(&self, message: &Message, _ctx: &ConversationContext) -> Result<()> {
        let Some(url) = &self.web_app_url else {
            return reply(self.bot.as_ref(), message, QUIZ_UNAVAILABLE).await;
        };
        let keyboard = InlineKeyboard::new().row(vec![InlineButton::WebApp {
            text: "Quiz".to_string(),
            url: url.clone(),
        }]);
        self.bot
            .send(OutgoingMessage::text(message.chat.id, QUIZ_TEXT).reply_markup(keyboard))
            .await
    }
}

/// `/cancel`: ends the conversation and drops its scratch data.
pub struct CancelCommand {
    bot: Arc<dyn Bot>,
}

impl CancelCommand {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for CancelCommand {
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        ctx.finish().await?;
        ctx.clear_data().await?;
        reply(self.bot.as_ref(), message, CANCELLED_TEXT).await
    }
}
