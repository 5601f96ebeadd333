//! # Quiz bot handlers
//!
//! Slash commands and the verification state machine:
//!
//! ```text
//! <default> --/register--> awaiting_login --login--> awaiting_otp --code--> registered
//! ```
//!
//! [`build_command_router`] and [`build_state_router`] wire everything from one
//! [`HandlerComponents`].

mod commands;
mod config;
mod mailer;
mod otp;
mod reply;
pub mod states;
mod verification;

pub use commands::{CancelCommand, QuizCommand, RegisterCommand, StartCommand};
pub use config::VerificationConfig;
pub use mailer::{VerificationMailer, VERIFICATION_SUBJECT};
pub use otp::{OtpGenerator, RandomOtpGenerator};
pub use verification::{DefaultHandler, LoginHandler, OtpHandler, RegisteredHandler};

use email_client::EmailSender;
use fsm_router::{CommandRouter, StateRouter};
use quizbot_core::Bot;
use std::sync::Arc;
use user_storage::UserRepository;

/// Collaborators shared by all handlers.
#[derive(Clone)]
pub struct HandlerComponents {
    pub bot: Arc<dyn Bot>,
    pub users: Arc<dyn UserRepository>,
    pub email: Arc<dyn EmailSender>,
    pub otp: Arc<dyn OtpGenerator>,
    pub verification: VerificationConfig,
    /// Web app opened by `/quiz`; `None` disables the button.
    pub quiz_web_app_url: Option<String>,
}

/// `/start`, `/help`, `/register`, `/quiz`, `/cancel`.
pub fn build_command_router(components: &HandlerComponents) -> CommandRouter {
    let start = Arc::new(StartCommand::new(components.bot.clone()));
    CommandRouter::new()
        .register("start", start.clone())
        .register("help", start)
        .register("register", Arc::new(RegisterCommand::new(components.bot.clone())))
        .register(
            "quiz",
            Arc::new(QuizCommand::new(
                components.bot.clone(),
                components.quiz_web_app_url.clone(),
            )),
        )
        .register("cancel", Arc::new(CancelCommand::new(components.bot.clone())))
}

/// One handler per verification state, including the default state.
pub fn build_state_router(components: &HandlerComponents) -> StateRouter {
    let mailer = VerificationMailer::new(
        components.email.clone(),
        components.verification.login_domain.clone(),
    );
    StateRouter::new()
        .on(
            states::DEFAULT,
            Arc::new(DefaultHandler::new(components.bot.clone())),
        )
        .on(
            states::AWAITING_LOGIN,
            Arc::new(LoginHandler::new(
                components.bot.clone(),
                components.otp.clone(),
                mailer,
                components.verification.clone(),
            )),
        )
        .on(
            states::AWAITING_OTP,
            Arc::new(OtpHandler::new(
                components.bot.clone(),
                components.users.clone(),
                components.verification.clone(),
            )),
        )
        .on(
            states::REGISTERED,
            Arc::new(RegisteredHandler::new(
                components.bot.clone(),
                components.users.clone(),
            )),
        )
}
