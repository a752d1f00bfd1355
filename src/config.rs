//! Configuration types.
//!
//! Everything is read once at startup into an immutable [`RelayConfig`]
//! and handed to the components that need it.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Confidence an item must strictly exceed to keep its best label.
pub const DEFAULT_MIN_SCORE: f64 = 0.70;

/// Default classification call timeout.
pub const DEFAULT_ENDPOINT_TIMEOUT_SECS: u64 = 30;

/// Default log verbosity when `LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Classification endpoint settings.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Zero-shot classification endpoint URL.
    pub endpoint_url: String,
    /// Optional bearer token sent with every request.
    pub api_token: Option<SecretString>,
    /// Per-call timeout.
    pub timeout: Duration,
}

/// Where qualifying items get published.
#[derive(Debug, Clone)]
pub enum NotifyConfig {
    /// Generic HTTP webhook; `target` is the topic the payload is addressed to.
    Webhook { url: String, target: String },
    /// Telegram Bot API; `chat_id` is the destination chat.
    Telegram {
        bot_token: SecretString,
        chat_id: String,
    },
}

impl NotifyConfig {
    /// Backend name for logging.
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Webhook { .. } => "webhook",
            Self::Telegram { .. } => "telegram",
        }
    }
}

/// Relay configuration, built from environment variables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub classifier: ClassifierConfig,
    /// Candidate labels, in the order they are sent to the endpoint.
    pub labels: Vec<String>,
    /// Confidence threshold (strict).
    pub min_score: f64,
    pub notify: NotifyConfig,
    /// Number of records processed concurrently within a batch.
    pub batch_concurrency: usize,
    /// `tracing` filter directive derived from `LOG_LEVEL`.
    pub log_level: String,
}

impl RelayConfig {
    /// Build config from the process environment.
    pub fn from_env() -> crate::error::Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Build config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()));

        let endpoint_url = require("ENDPOINT_URL")?;
        let api_token = get("ENDPOINT_API_TOKEN").map(SecretString::from);
        let timeout_secs: u64 = parse_or(
            "ENDPOINT_TIMEOUT_SECS",
            get("ENDPOINT_TIMEOUT_SECS"),
            DEFAULT_ENDPOINT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(invalid("ENDPOINT_TIMEOUT_SECS", "must be greater than zero"));
        }

        let labels = parse_labels(&require("LABELS")?);
        if labels.is_empty() {
            return Err(invalid("LABELS", "no candidate labels after splitting on ','"));
        }

        let min_score: f64 = parse_or("MIN_SCORE", get("MIN_SCORE"), DEFAULT_MIN_SCORE)?;
        if !min_score.is_finite() {
            return Err(invalid("MIN_SCORE", "must be a finite number"));
        }

        let target = require("NOTIFY_TARGET")?;
        let backend = get("NOTIFY_BACKEND").unwrap_or_else(|| "webhook".to_string());
        let notify = match backend.to_lowercase().as_str() {
            "webhook" => NotifyConfig::Webhook {
                url: require("NOTIFY_WEBHOOK_URL")?,
                target,
            },
            "telegram" => NotifyConfig::Telegram {
                bot_token: SecretString::from(require("TELEGRAM_BOT_TOKEN")?),
                chat_id: target,
            },
            other => {
                return Err(invalid(
                    "NOTIFY_BACKEND",
                    &format!("unknown backend '{other}' (expected webhook or telegram)"),
                ));
            }
        };

        let batch_concurrency: usize =
            parse_or("BATCH_CONCURRENCY", get("BATCH_CONCURRENCY"), 1)?;
        if batch_concurrency == 0 {
            return Err(invalid("BATCH_CONCURRENCY", "must be at least 1"));
        }

        let log_level = log_filter(get("LOG_LEVEL").as_deref().unwrap_or(DEFAULT_LOG_LEVEL));

        Ok(Self {
            classifier: ClassifierConfig {
                endpoint_url,
                api_token,
                timeout: Duration::from_secs(timeout_secs),
            },
            labels,
            min_score,
            notify,
            batch_concurrency,
            log_level,
        })
    }
}

/// Split a comma-separated label list, trimming whitespace and dropping blanks.
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Map a log level name to a `tracing` filter directive.
///
/// Accepts the usual `tracing` names plus `WARNING`, `CRITICAL` and `FATAL`,
/// case-insensitively. Anything else is passed through as a raw directive.
pub fn log_filter(level: &str) -> String {
    match level.trim().to_lowercase().as_str() {
        "warning" | "warn" => "warn".to_string(),
        "critical" | "fatal" | "error" => "error".to_string(),
        "info" => "info".to_string(),
        "debug" => "debug".to_string(),
        "trace" => "trace".to_string(),
        "off" | "none" => "off".to_string(),
        other => other.to_string(),
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| invalid(key, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("ENDPOINT_URL", "http://localhost:8080/classify"),
            ("LABELS", "complaint,praise"),
            ("NOTIFY_TARGET", "alerts"),
            ("NOTIFY_WEBHOOK_URL", "http://localhost:9090/hook"),
        ]
    }

    #[test]
    fn defaults_applied() {
        let config = RelayConfig::from_lookup(lookup(&base())).unwrap();
        assert_eq!(config.labels, vec!["complaint", "praise"]);
        assert!((config.min_score - 0.70).abs() < f64::EPSILON);
        assert_eq!(config.classifier.timeout, Duration::from_secs(30));
        assert!(config.classifier.api_token.is_none());
        assert_eq!(config.batch_concurrency, 1);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.notify.backend(), "webhook");
        match config.notify {
            NotifyConfig::Webhook { url, target } => {
                assert_eq!(url, "http://localhost:9090/hook");
                assert_eq!(target, "alerts");
            }
            other => panic!("expected webhook, got {other:?}"),
        }
    }

    #[test]
    fn missing_endpoint_is_reported() {
        let pairs: Vec<_> = base()
            .into_iter()
            .filter(|(k, _)| *k != "ENDPOINT_URL")
            .collect();
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "ENDPOINT_URL"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = base();
        pairs.push(("MIN_SCORE", "   "));
        let config = RelayConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!((config.min_score - DEFAULT_MIN_SCORE).abs() < f64::EPSILON);
    }

    #[test]
    fn labels_only_commas_rejected() {
        let mut pairs = base();
        pairs.retain(|(k, _)| *k != "LABELS");
        pairs.push(("LABELS", " , ,"));
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "LABELS"));
    }

    #[test]
    fn invalid_threshold_rejected() {
        let mut pairs = base();
        pairs.push(("MIN_SCORE", "high"));
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "MIN_SCORE"));
    }

    #[test]
    fn zero_concurrency_rejected() {
        let mut pairs = base();
        pairs.push(("BATCH_CONCURRENCY", "0"));
        assert!(RelayConfig::from_lookup(lookup(&pairs)).is_err());
    }

    #[test]
    fn telegram_backend_requires_token() {
        let mut pairs = base();
        pairs.push(("NOTIFY_BACKEND", "telegram"));
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "TELEGRAM_BOT_TOKEN"));

        pairs.push(("TELEGRAM_BOT_TOKEN", "123:ABC"));
        let config = RelayConfig::from_lookup(lookup(&pairs)).unwrap();
        match config.notify {
            NotifyConfig::Telegram { bot_token, chat_id } => {
                assert_eq!(bot_token.expose_secret(), "123:ABC");
                assert_eq!(chat_id, "alerts");
            }
            other => panic!("expected telegram, got {other:?}"),
        }
    }

    #[test]
    fn unknown_backend_rejected() {
        let mut pairs = base();
        pairs.push(("NOTIFY_BACKEND", "carrier-pigeon"));
        let err = RelayConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "NOTIFY_BACKEND")
        );
    }

    #[test]
    fn api_token_is_redacted_in_debug() {
        let mut pairs = base();
        pairs.push(("ENDPOINT_API_TOKEN", "hf_supersecret"));
        let config = RelayConfig::from_lookup(lookup(&pairs)).unwrap();
        assert!(!format!("{config:?}").contains("hf_supersecret"));
    }

    #[test]
    fn parse_labels_trims_and_drops_blanks() {
        assert_eq!(
            parse_labels(" complaint , praise,,question "),
            vec!["complaint", "praise", "question"]
        );
        assert!(parse_labels("").is_empty());
    }

    #[test]
    fn log_filter_accepts_python_style_names() {
        assert_eq!(log_filter("WARNING"), "warn");
        assert_eq!(log_filter("CRITICAL"), "error");
        assert_eq!(log_filter("Info"), "info");
        assert_eq!(log_filter("classify_relay=debug"), "classify_relay=debug");
    }
}
