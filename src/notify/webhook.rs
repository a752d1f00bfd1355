//! Webhook notifier: POSTs the serialized item to an HTTP endpoint.
//!
//! Body: `{"target": <topic>, "message": <serialized item>}`. Any non-2xx
//! status counts as a failed publish.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use crate::error::NotificationError;
use crate::notify::Notifier;
use crate::pipeline::types::EnrichedItem;

/// Envelope posted to the webhook.
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    target: &'a str,
    message: &'a str,
}

/// Publishes alerts to a generic HTTP webhook.
pub struct WebhookNotifier {
    url: String,
    target: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, target: String) -> Self {
        Self {
            url,
            target,
            client: reqwest::Client::new(),
        }
    }

    fn send_error(&self, reason: impl Into<String>) -> NotificationError {
        NotificationError::SendFailed {
            channel: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, item: &EnrichedItem) -> Result<(), NotificationError> {
        let message = item.to_json()?;
        info!(target_topic = %self.target, "Publishing alert");

        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                target: &self.target,
                message: &message,
            })
            .send()
            .await
            .map_err(|e| self.send_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.send_error(format!("status {status}: {body}")));
        }

        Ok(())
    }
}
