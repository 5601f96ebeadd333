use quizbot_core::{Bot, Message, OutgoingMessage, ParseMode, Result};

pub(crate) async fn reply(bot: &dyn Bot, message: &Message, text: impl Into<String>) -> Result<()> {
    bot.send(OutgoingMessage::text(message.chat.id, text)).await
}

pub(crate) async fn reply_html(
    bot: &dyn Bot,
    message: &Message,
    html: impl Into<String>,
) -> Result<()> {
    bot.send(OutgoingMessage::text(message.chat.id, html).parse_mode(ParseMode::Html))
        .await
}

/// Escapes user-supplied text for Telegram HTML.
pub(crate) fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
