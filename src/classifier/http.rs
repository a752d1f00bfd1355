//! HTTP zero-shot classifier.
//!
//! POSTs `{"inputs", "parameters": {"candidate_labels", "multi_class"}}`
//! to the configured endpoint and parses the `labels`/`scores` reply.
//! No retry and no caching: every call is a fresh round-trip, bounded
//! by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::classifier::{
    ClassificationResult, ZeroShotClassifier, ZeroShotRequest, ZeroShotResponse,
};
use crate::config::ClassifierConfig;
use crate::error::{ClassificationError, ConfigError};

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_PREVIEW: usize = 512;

/// Some deployments wrap the single result in a one-element array.
#[derive(Deserialize)]
#[serde(untagged)]
enum ResponseBody {
    Single(ZeroShotResponse),
    Wrapped(Vec<ZeroShotResponse>),
}

/// Zero-shot classifier backed by an HTTP inference endpoint.
pub struct HttpClassifier {
    endpoint_url: String,
    api_token: Option<SecretString>,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpClassifier {
    /// Build the long-lived client. Created once at startup.
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint_url: config.endpoint_url.clone(),
            api_token: config.api_token.clone(),
            timeout: config.timeout,
            client,
        })
    }

    fn request_error(&self, e: reqwest::Error) -> ClassificationError {
        if e.is_timeout() {
            ClassificationError::Timeout {
                endpoint: self.endpoint_url.clone(),
                timeout: self.timeout,
            }
        } else {
            ClassificationError::RequestFailed {
                endpoint: self.endpoint_url.clone(),
                reason: e.to_string(),
            }
        }
    }

    fn parse_body(&self, raw: &str) -> Result<ZeroShotResponse, ClassificationError> {
        let body: ResponseBody =
            serde_json::from_str(raw).map_err(|e| ClassificationError::InvalidResponse {
                endpoint: self.endpoint_url.clone(),
                reason: e.to_string(),
            })?;

        match body {
            ResponseBody::Single(response) => Ok(response),
            ResponseBody::Wrapped(mut responses) if !responses.is_empty() => {
                Ok(responses.swap_remove(0))
            }
            ResponseBody::Wrapped(_) => Err(ClassificationError::InvalidResponse {
                endpoint: self.endpoint_url.clone(),
                reason: "empty result array".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpClassifier {
    fn endpoint(&self) -> &str {
        &self.endpoint_url
    }

    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<ClassificationResult, ClassificationError> {
        if labels.is_empty() {
            return Err(ClassificationError::NoLabels);
        }

        debug!(
            endpoint = %self.endpoint_url,
            labels = ?labels,
            "Invoking classification endpoint"
        );

        let mut request = self
            .client
            .post(&self.endpoint_url)
            .json(&ZeroShotRequest::new(text, labels));
        if let Some(ref token) = self.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(|e| self.request_error(e))?;

        let status = response.status();
        let raw = response.text().await.map_err(|e| self.request_error(e))?;

        if !status.is_success() {
            return Err(ClassificationError::Status {
                endpoint: self.endpoint_url.clone(),
                status: status.as_u16(),
                body: raw.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        debug!(endpoint = %self.endpoint_url, response = %raw, "Classification response");

        self.parse_body(&raw)?.into_result(&self.endpoint_url)
    }
}
