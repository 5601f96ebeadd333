//! Wraps teloxide::Bot and implements [`quizbot_core::Bot`].

use async_trait::async_trait;
use quizbot_core::{Bot as CoreBot, BotError, InlineButton, InlineKeyboard, OutgoingMessage, ParseMode, Result};
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use tracing::debug;

/// Thin wrapper around teloxide::Bot that implements quizbot-core's Bot trait.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    /// Returns the underlying teloxide::Bot for direct API use when needed.
    pub fn inner(&self) -> &teloxide::Bot {
        &self.bot
    }
}

fn to_parse_mode(mode: ParseMode) -> teloxide::types::ParseMode {
    match mode {
        ParseMode::Html => teloxide::types::ParseMode::Html,
        ParseMode::MarkdownV2 => teloxide::types::ParseMode::MarkdownV2,
    }
}

fn parse_url(url: &str) -> Result<reqwest::Url> {
    reqwest::Url::parse(url).map_err(|e| BotError::Bot(format!("Invalid button URL '{}': {}", url, e)))
}

fn to_inline_markup(keyboard: &InlineKeyboard) -> Result<InlineKeyboardMarkup> {
    let rows = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    Ok(match button {
                        InlineButton::Url { text, url } => {
                            InlineKeyboardButton::url(text.clone(), parse_url(url)?)
                        }
                        InlineButton::WebApp { text, url } => InlineKeyboardButton::web_app(
                            text.clone(),
                            WebAppInfo {
                                url: parse_url(url)?,
                            },
                        ),
                        InlineButton::Callback { text, data } => {
                            InlineKeyboardButton::callback(text.clone(), data.clone())
                        }
                    })
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(InlineKeyboardMarkup::new(rows))
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send(&self, message: OutgoingMessage) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(message.chat_id), message.text);
        if let Some(mode) = message.parse_mode {
            request = request.parse_mode(to_parse_mode(mode));
        }
        if let Some(keyboard) = &message.reply_markup {
            request = request.reply_markup(to_inline_markup(keyboard)?);
        }
        let sent = request
            .await
            .map_err(|e| BotError::Bot(e.to_string()))?;
        debug!(chat_id = message.chat_id, message_id = ?sent.id, "Message sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn test_web_app_button_mapping() {
        let keyboard = InlineKeyboard::new().row(vec![InlineButton::WebApp {
            text: "Quiz".to_string(),
            url: "https://quiz.example.com/app".to_string(),
        }]);

        let markup = to_inline_markup(&keyboard).unwrap();

        assert_eq!(markup.inline_keyboard.len(), 1);
        let button = &markup.inline_keyboard[0][0];
        assert_eq!(button.text, "Quiz");
        match &button.kind {
            InlineKeyboardButtonKind::WebApp(info) => {
                assert_eq!(info.url.as_str(), "https://quiz.example.com/app")
            }
            other => panic!("unexpected button kind: {other:?}"),
        }
    }

    #[test]
    fn test_rows_and_callback_buttons() {
        let keyboard = InlineKeyboard::new()
            .row(vec![
                InlineButton::Callback {
                    text: "A".to_string(),
                    data: "answer:a".to_string(),
                },
                InlineButton::Callback {
                    text: "B".to_string(),
                    data: "answer:b".to_string(),
                },
            ])
            .row(vec![InlineButton::Url {
                text: "Docs".to_string(),
                url: "https://example.com/docs".to_string(),
            }]);

        let markup = to_inline_markup(&keyboard).unwrap();
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert!(matches!(
            &markup.inline_keyboard[0][1].kind,
            InlineKeyboardButtonKind::CallbackData(data) if data == "answer:b"
        ));
    }

    #[test]
    fn test_invalid_url_is_a_bot_error() {
        let keyboard = InlineKeyboard::new().row(vec![InlineButton::Url {
            text: "Broken".to_string(),
            url: "not a url".to_string(),
        }]);
        assert!(matches!(to_inline_markup(&keyboard), Err(BotError::Bot(_))));
    }

    #[test]
    fn test_parse_mode_mapping() {
        assert_eq!(
            to_parse_mode(ParseMode::Html),
            teloxide::types::ParseMode::Html
        );
        assert_eq!(
            to_parse_mode(ParseMode::MarkdownV2),
            teloxide::types::ParseMode::MarkdownV2
        );
    }
}
