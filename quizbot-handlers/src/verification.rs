//! State handlers of the verification flow.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fsm_router::{ConversationContext, Handler};
use quizbot_core::{Bot, BotError, Message, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use user_storage::{RoleFlags, UserRecord, UserRepository};

use crate::config::VerificationConfig;
use crate::mailer::VerificationMailer;
use crate::otp::OtpGenerator;
use crate::reply::{escape_html, reply, reply_html};
use crate::states::{self, FIELD_CODE, FIELD_EXPIRES_AT, FIELD_LOGIN};

pub const DEFAULT_TEXT: &str = "I'm not sure how to respond. Try the /start command.";
pub const INVALID_CODE_TEXT: &str = "❌ Invalid verification code. Please enter the verification code:";
pub const EMAIL_FAILED_TEXT: &str =
    "⚠️ Could not send the verification code. Please enter your login again:";
pub const CODE_EXPIRED_TEXT: &str =
    "⌛ The verification code has expired. Please enter your login again to get a new one:";
pub const SESSION_EXPIRED_TEXT: &str =
    "Your registration session has expired. Please send /register again.";
pub const EMPTY_LOGIN_TEXT: &str = "Login must not be empty. Please enter your login:";

/// Default state: nudges the user towards `/start`.
pub struct DefaultHandler {
    bot: Arc<dyn Bot>,
}

impl DefaultHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for DefaultHandler {
    async fn handle(&self, message: &Message, _ctx: &ConversationContext) -> Result<()> {
        reply(self.bot.as_ref(), message, DEFAULT_TEXT).await
    }
}

/// `awaiting_login`: stores the login, emails a fresh code and moves to `awaiting_otp`.
pub struct LoginHandler {
    bot: Arc<dyn Bot>,
    otp: Arc<dyn OtpGenerator>,
    mailer: VerificationMailer,
    config: VerificationConfig,
}

impl LoginHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        otp: Arc<dyn OtpGenerator>,
        mailer: VerificationMailer,
        config: VerificationConfig,
    ) -> Self {
        Self {
            bot,
            otp,
            mailer,
            config,
        }
    }
}

#[async_trait]
impl Handler for LoginHandler {
    #[instrument(skip_all, fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        let login = message.content.trim();
        if login.is_empty() {
            return reply(self.bot.as_ref(), message, EMPTY_LOGIN_TEXT).await;
        }

        ctx.set_data(FIELD_LOGIN, Value::from(login)).await?;
        let code = self.otp.generate()?;
        ctx.set_data(FIELD_CODE, Value::from(code.as_str())).await?;

        let validity = chrono::Duration::from_std(self.config.code_validity)
            .map_err(|e| BotError::Config(format!("invalid code validity: {}", e)))?;
        let expires_at = Utc::now() + validity;
        if self.config.enforce_code_expiry {
            ctx.set_data(FIELD_EXPIRES_AT, Value::from(expires_at.to_rfc3339()))
                .await?;
        }

        let recipient = match self.mailer.send_code(login, &code, expires_at).await {
            Ok(recipient) => recipient,
            Err(e) => {
                error!(error = %e, login = %login, "Failed to send verification email");
                if self.config.block_on_email_failure {
                    return reply(self.bot.as_ref(), message, EMAIL_FAILED_TEXT).await;
                }
                self.mailer.recipient(login)
            }
        };

        ctx.set(&states::AWAITING_OTP).await?;
        info!(
            user_id = message.user.id,
            login = %login,
            "step: verification code issued"
        );

        let minutes = self.config.code_validity.as_secs() / 60;
        let text = format!(
            "Thanks! A verification code was sent to <b>{}</b>. It is valid for {} minutes.\nPlease enter it:",
            escape_html(&recipient),
            minutes
        );
        reply_html(self.bot.as_ref(), message, text).await
    }
}

/// `awaiting_otp`: checks the code; on match registers the user and moves to `registered`.
pub struct OtpHandler {
    bot: Arc<dyn Bot>,
    users: Arc<dyn UserRepository>,
    config: VerificationConfig,
}

impl OtpHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        users: Arc<dyn UserRepository>,
        config: VerificationConfig,
    ) -> Self {
        Self { bot, users, config }
    }

    async fn code_expired(&self, ctx: &ConversationContext) -> Result<bool> {
        if !self.config.enforce_code_expiry {
            return Ok(false);
        }
        let Some(raw) = ctx.get_as::<String>(FIELD_EXPIRES_AT).await? else {
            return Ok(false);
        };
        let expires_at = DateTime::parse_from_rfc3339(&raw)
            .map_err(|e| BotError::Validation(format!("bad expires_at '{}': {}", raw, e)))?;
        Ok(Utc::now() > expires_at)
    }
}

#[async_trait]
impl Handler for OtpHandler {
    #[instrument(skip_all, fields(chat_id = message.chat.id, user_id = message.user.id))]
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        let expected = ctx.get_as::<String>(FIELD_CODE).await?;
        let login = ctx.get_as::<String>(FIELD_LOGIN).await?;
        let (Some(expected), Some(login)) = (expected, login) else {
            warn!(user_id = message.user.id, "verification scratch data missing");
            ctx.reset_state().await?;
            return reply(self.bot.as_ref(), message, SESSION_EXPIRED_TEXT).await;
        };

        if self.code_expired(ctx).await? {
            info!(user_id = message.user.id, "step: verification code expired");
            ctx.set(&states::AWAITING_LOGIN).await?;
            return reply(self.bot.as_ref(), message, CODE_EXPIRED_TEXT).await;
        }

        let input = message.content.trim();
        if input.len() != self.config.code_length || input != expected {
            info!(user_id = message.user.id, "step: verification code rejected");
            return reply(self.bot.as_ref(), message, INVALID_CODE_TEXT).await;
        }

        let user = UserRecord::new(login.as_str(), Some(message.user.id), RoleFlags::USER);
        self.users.update_or_create(&user).await?;
        ctx.set(&states::REGISTERED).await?;
        info!(
            user_id = message.user.id,
            login = %login,
            "step: registration complete"
        );

        reply(
            self.bot.as_ref(),
            message,
            format!(
                "✅ Registration complete! Welcome, {}!\nOpen the quiz service with /quiz",
                login
            ),
        )
        .await
    }
}

/// `registered`: re-confirms the user record and says so.
pub struct RegisteredHandler {
    bot: Arc<dyn Bot>,
    users: Arc<dyn UserRepository>,
}

impl RegisteredHandler {
    pub fn new(bot: Arc<dyn Bot>, users: Arc<dyn UserRepository>) -> Self {
        Self { bot, users }
    }
}

#[async_trait]
impl Handler for RegisteredHandler {
    async fn handle(&self, message: &Message, ctx: &ConversationContext) -> Result<()> {
        let Some(login) = ctx.get_as::<String>(FIELD_LOGIN).await? else {
            // Scratch data outlived by the state record.
            ctx.reset_state().await?;
            return reply(self.bot.as_ref(), message, SESSION_EXPIRED_TEXT).await;
        };

        let user = UserRecord::new(login.as_str(), Some(message.user.id), RoleFlags::USER);
        self.users.update_or_create(&user).await?;

        reply(
            self.bot.as_ref(),
            message,
            format!("Hello {}! You are already registered.", login),
        )
        .await
    }
}
