//! Alert publishing for items that merit attention.
//!
//! A notifier receives the full enriched record, serializes it and sends
//! it to one configured destination. Failures are returned to the caller;
//! publishing is part of the record's unit of work.

pub mod telegram;
pub mod webhook;

pub use telegram::TelegramNotifier;
pub use webhook::WebhookNotifier;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::NotifyConfig;
use crate::error::NotificationError;
use crate::pipeline::types::EnrichedItem;

/// Trait for notification backends. Pure I/O, no decision logic.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Backend name (e.g. "webhook", "telegram").
    fn name(&self) -> &str;

    /// Publish one enriched item.
    async fn publish(&self, item: &EnrichedItem) -> Result<(), NotificationError>;
}

/// Create the notifier described by `config`. Called once at startup.
pub fn create_notifier(config: &NotifyConfig) -> Arc<dyn Notifier> {
    let notifier: Arc<dyn Notifier> = match config {
        NotifyConfig::Webhook { url, target } => {
            Arc::new(WebhookNotifier::new(url.clone(), target.clone()))
        }
        NotifyConfig::Telegram { bot_token, chat_id } => {
            Arc::new(TelegramNotifier::new(bot_token.clone(), chat_id.clone()))
        }
    };
    tracing::info!(backend = notifier.name(), "Notifier ready");
    notifier
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn creates_webhook_notifier() {
        let notifier = create_notifier(&NotifyConfig::Webhook {
            url: "http://localhost:9/hook".into(),
            target: "alerts".into(),
        });
        assert_eq!(notifier.name(), "webhook");
    }

    #[test]
    fn creates_telegram_notifier() {
        let notifier = create_notifier(&NotifyConfig::Telegram {
            bot_token: SecretString::from("123:ABC"),
            chat_id: "42".into(),
        });
        assert_eq!(notifier.name(), "telegram");
    }
}
