//! Telegram notification client for fire mission traffic
//!
//! Delivery is advisory: the domain transition has already committed by
//! the time a message goes out, so `send` reports success as a bool and
//! never produces an error the caller would have to unwind.

use reqwest::Client;
use serde::Serialize;

use crate::core::error::{FirelineError, Result};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Async Telegram Bot API client
pub struct TelegramClient {
    client: Client,
    bot_token: String,
    /// Fallback recipient when a user has no chat id configured
    default_chat_id: Option<String>,
}

impl TelegramClient {
    pub fn new(bot_token: String, default_chat_id: Option<String>) -> Self {
        Self { client: Client::new(), bot_token, default_chat_id }
    }

    /// Create a client from environment variables
    ///
    /// Required: TELEGRAM_BOT_TOKEN
    /// Optional: TELEGRAM_CHAT_ID (default recipient)
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| FirelineError::NotifyError("TELEGRAM_BOT_TOKEN not set".into()))?;
        let default_chat_id = std::env::var("TELEGRAM_CHAT_ID").ok();
        Ok(Self::new(bot_token, default_chat_id))
    }

    pub fn default_chat_id(&self) -> Option<&str> {
        self.default_chat_id.as_deref()
    }

    /// Send a MarkdownV2 message. Returns whether the API accepted it;
    /// failures are logged and swallowed.
    pub async fn send(&self, chat_id: &str, text: &str) -> bool {
        let escaped = escape_markdown_v2(text);
        let request = SendMessageRequest { chat_id, text: &escaped, parse_mode: "MarkdownV2" };
        let url = format!("{}/bot{}/sendMessage", API_BASE, self.bot_token);

        match self.client.post(&url).json(&request).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!("telegram rejected message: {} {}", status, body);
                false
            }
            Err(e) => {
                tracing::warn!("telegram send failed: {}", e);
                false
            }
        }
    }
}

/// Escape the characters MarkdownV2 reserves
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|'
            | '{' | '}' | '.' | '!' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserves_markdown_characters() {
        assert_eq!(escape_markdown_v2("bearing 270."), "bearing 270\\.");
        assert_eq!(escape_markdown_v2("a-b (c)"), "a\\-b \\(c\\)");
    }

    #[test]
    fn test_escape_leaves_plain_text_alone() {
        assert_eq!(escape_markdown_v2("FIRE MISSION 42"), "FIRE MISSION 42");
    }
}
