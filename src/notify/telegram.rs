//! Telegram notifier: sends the serialized item to a chat via the Bot API.
//!
//! The payload is sent as plain text (no `parse_mode`): it's JSON, and
//! Markdown parsing would mangle the underscores in its keys.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::error::NotificationError;
use crate::notify::Notifier;
use crate::pipeline::types::EnrichedItem;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Publishes alerts to a single Telegram chat.
pub struct TelegramNotifier {
    bot_token: SecretString,
    chat_id: String,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(bot_token: SecretString, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            api_base: TELEGRAM_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the notifier at a different Bot API host.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base,
            self.bot_token.expose_secret()
        )
    }

    /// Send a text message, split into chunks under Telegram's limit.
    async fn send_message(&self, text: &str) -> Result<(), NotificationError> {
        let chunks = split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH);
        debug!(chunks = chunks.len(), chat_id = %self.chat_id, "Sending Telegram alert");

        for chunk in &chunks {
            self.send_message_chunk(chunk).await?;
        }
        Ok(())
    }

    async fn send_message_chunk(&self, text: &str) -> Result<(), NotificationError> {
        let body = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
        });

        let resp = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed {
                channel: "telegram".into(),
                // reqwest errors embed the URL, which carries the bot token.
                reason: e.without_url().to_string(),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let err = resp.text().await.unwrap_or_default();
            return Err(NotificationError::SendFailed {
                channel: "telegram".into(),
                reason: format!("sendMessage failed ({status}): {err}"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn publish(&self, item: &EnrichedItem) -> Result<(), NotificationError> {
        let message = item.to_json()?;
        info!(chat_id = %self.chat_id, "Publishing alert");
        self.send_message(&message).await
    }
}

/// Split a message into chunks of at most `max_len` bytes.
///
/// Nothing is dropped: the chunks concatenate back to `text`. The payload
/// is serialized JSON, so splits fall on char boundaries rather than on
/// whitespace.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    while remaining.len() > max_len {
        let mut split_at = max_len;
        while !remaining.is_char_boundary(split_at) {
            split_at -= 1;
        }
        // A limit below one char's width still has to make progress.
        if split_at == 0 {
            split_at = remaining.chars().next().map_or(remaining.len(), char::len_utf8);
        }

        let (head, tail) = remaining.split_at(split_at);
        chunks.push(head.to_string());
        remaining = tail;
    }
    chunks.push(remaining.to_string());

    chunks
}
