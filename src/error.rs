//! Error types for the classification relay.

use std::time::Duration;

/// Top-level error for one relay invocation.
///
/// Record-scoped failures never show up here; they are reported per record
/// in the batch response.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed queue event: {0}")]
    MalformedEvent(#[source] serde_json::Error),

    #[error("Failed to serialize batch response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("All {failed} records failed processing")]
    BatchFailed { failed: usize },
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Failure to turn a message body into an item.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Malformed message body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Message body is not a JSON object")]
    NotAnObject,

    #[error("Message body has no string `text` field")]
    MissingText,
}

/// Classification endpoint errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassificationError {
    #[error("No candidate labels supplied")]
    NoLabels,

    #[error("Endpoint {endpoint} request failed: {reason}")]
    RequestFailed { endpoint: String, reason: String },

    #[error("Endpoint {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Endpoint {endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    #[error("Endpoint {endpoint} returned no scores")]
    EmptyScores { endpoint: String },
}

/// Notification channel errors.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Failed to publish on {channel}: {reason}")]
    SendFailed { channel: String, reason: String },

    #[error("Failed to serialize item: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Anything that fails a single record. Never aborts the batch.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Decode failed: {0}")]
    Decode(#[from] DecodeError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Notification failed: {0}")]
    Notification(#[from] NotificationError),
}

impl RecordError {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Decode(_) => "decode",
            Self::Classification(_) => "classification",
            Self::Notification(_) => "notification",
        }
    }
}

/// Result type alias for the relay.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_error_labels() {
        let decode: RecordError = DecodeError::NotAnObject.into();
        assert_eq!(decode.label(), "decode");

        let classify: RecordError = ClassificationError::NoLabels.into();
        assert_eq!(classify.label(), "classification");

        let notify: RecordError = NotificationError::SendFailed {
            channel: "webhook".into(),
            reason: "connection refused".into(),
        }
        .into();
        assert_eq!(notify.label(), "notification");
    }

    #[test]
    fn record_error_display_keeps_cause() {
        let err: RecordError = ClassificationError::EmptyScores {
            endpoint: "http://model".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Classification failed: Endpoint http://model returned no scores"
        );
    }

    #[test]
    fn config_error_converts_to_top_level() {
        let err: Error = ConfigError::MissingEnvVar("LABELS".into()).into();
        assert!(matches!(err, Error::Config(ConfigError::MissingEnvVar(_))));
        assert_eq!(
            err.to_string(),
            "Configuration error: Missing required environment variable: LABELS"
        );
    }
}
