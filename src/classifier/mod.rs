//! Zero-shot classification client.
//!
//! The relay talks to an external inference endpoint that scores a piece
//! of text against a caller-supplied set of candidate labels. The
//! [`ZeroShotClassifier`] trait is the seam; [`HttpClassifier`] is the
//! production implementation.

pub mod http;

pub use http::HttpClassifier;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ClassificationError;

/// Trait for zero-shot classification backends.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Endpoint identifier, for logging and error context.
    fn endpoint(&self) -> &str;

    /// Score `text` against `labels`.
    ///
    /// `labels` must be non-empty. `text` is forwarded as-is, empty included.
    async fn classify(
        &self,
        text: &str,
        labels: &[String],
    ) -> Result<ClassificationResult, ClassificationError>;
}

// ── Wire types ──────────────────────────────────────────────────────

/// Request body sent to the inference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZeroShotRequest {
    pub inputs: String,
    pub parameters: ZeroShotParameters,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZeroShotParameters {
    pub candidate_labels: Vec<String>,
    pub multi_class: bool,
}

impl ZeroShotRequest {
    /// Single-label request for `text`.
    pub fn new(text: &str, labels: &[String]) -> Self {
        Self {
            inputs: text.to_string(),
            parameters: ZeroShotParameters {
                candidate_labels: labels.to_vec(),
                multi_class: false,
            },
        }
    }
}

/// Response body: parallel `labels`/`scores` arrays.
///
/// Other keys the service may add (e.g. `sequence`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZeroShotResponse {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ZeroShotResponse {
    /// Validate the response and turn it into a [`ClassificationResult`].
    pub fn into_result(self, endpoint: &str) -> Result<ClassificationResult, ClassificationError> {
        if self.scores.is_empty() {
            return Err(ClassificationError::EmptyScores {
                endpoint: endpoint.to_string(),
            });
        }
        if self.labels.len() != self.scores.len() {
            return Err(ClassificationError::InvalidResponse {
                endpoint: endpoint.to_string(),
                reason: format!(
                    "{} labels but {} scores",
                    self.labels.len(),
                    self.scores.len()
                ),
            });
        }
        Ok(ClassificationResult::from_parallel(self.labels, self.scores))
    }
}

// ── Classification result ───────────────────────────────────────────

/// Outcome of one classification call.
///
/// `label`/`score` hold the best candidate; on ties the first maximum in
/// service order wins. `scores_by_label` keeps the full distribution in
/// the order the service returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationResult {
    pub label: String,
    pub score: f64,
    pub scores_by_label: Vec<(String, f64)>,
}

impl ClassificationResult {
    /// Build from non-empty, equal-length label and score sequences.
    fn from_parallel(labels: Vec<String>, scores: Vec<f64>) -> Self {
        let mut best = 0;
        for (i, score) in scores.iter().enumerate() {
            if *score > scores[best] {
                best = i;
            }
        }

        Self {
            label: labels[best].clone(),
            score: scores[best],
            scores_by_label: labels.into_iter().zip(scores).collect(),
        }
    }

    /// Full distribution as a JSON object, label → raw score.
    ///
    /// A label the service repeats keeps its first position and its last score.
    pub fn distribution(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for (label, score) in &self.scores_by_label {
            map.insert(label.clone(), Value::from(*score));
        }
        map
    }

    /// Serialized form of [`Self::distribution`], stored on the enriched item.
    pub fn distribution_json(&self) -> String {
        Value::Object(self.distribution()).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(labels: &[&str], scores: &[f64]) -> ZeroShotResponse {
        ZeroShotResponse {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            scores: scores.to_vec(),
        }
    }

    #[test]
    fn request_payload_shape() {
        let labels = vec!["complaint".to_string(), "praise".to_string()];
        let json = serde_json::to_value(ZeroShotRequest::new("Great service!", &labels)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inputs": "Great service!",
                "parameters": {
                    "candidate_labels": ["complaint", "praise"],
                    "multi_class": false
                }
            })
        );
    }

    #[test]
    fn response_ignores_extra_keys() {
        let raw = r#"{"sequence": "hi", "labels": ["a", "b"], "scores": [0.6, 0.4]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, response(&["a", "b"], &[0.6, 0.4]));
    }

    #[test]
    fn response_missing_scores_fails_to_parse() {
        let raw = r#"{"labels": ["a", "b"]}"#;
        assert!(serde_json::from_str::<ZeroShotResponse>(raw).is_err());
    }

    #[test]
    fn best_label_is_argmax() {
        let result = response(&["praise", "complaint"], &[0.95, 0.05])
            .into_result("test")
            .unwrap();
        assert_eq!(result.label, "praise");
        assert_eq!(result.score, 0.95);
    }

    #[test]
    fn best_label_picks_max_regardless_of_position() {
        let result = response(&["a", "b", "c"], &[0.1, 0.2, 0.7])
            .into_result("test")
            .unwrap();
        assert_eq!(result.label, "c");
        assert_eq!(result.score, 0.7);
    }

    #[test]
    fn tie_goes_to_first_occurrence() {
        let result = response(&["a", "b", "c"], &[0.9, 0.9, 0.2])
            .into_result("test")
            .unwrap();
        assert_eq!(result.label, "a");
    }

    #[test]
    fn empty_scores_rejected() {
        let err = response(&[], &[]).into_result("http://model").unwrap_err();
        assert!(matches!(err, ClassificationError::EmptyScores { .. }));
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = response(&["a", "b"], &[0.5]).into_result("test").unwrap_err();
        assert!(matches!(err, ClassificationError::InvalidResponse { .. }));
    }

    #[test]
    fn distribution_preserves_service_order() {
        let result = response(&["praise", "complaint", "question"], &[0.5, 0.3, 0.2])
            .into_result("test")
            .unwrap();
        let dist = result.distribution();
        let keys: Vec<&String> = dist.keys().collect();
        assert_eq!(keys, vec!["praise", "complaint", "question"]);
    }

    #[test]
    fn distribution_json_round_trips() {
        let result = response(
            &["praise", "complaint"],
            &[0.9512345678901234, 0.048765432109876],
        )
        .into_result("test")
        .unwrap();

        let parsed: Map<String, Value> =
            serde_json::from_str(&result.distribution_json()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["praise"].as_f64(), Some(0.9512345678901234));
        assert_eq!(parsed["complaint"].as_f64(), Some(0.048765432109876));
        assert_eq!(parsed, result.distribution());
    }

    #[test]
    fn distribution_repeated_label_keeps_last_score() {
        let result = response(&["a", "b", "a"], &[0.1, 0.3, 0.6])
            .into_result("test")
            .unwrap();
        let dist = result.distribution();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist["a"].as_f64(), Some(0.6));
        assert_eq!(dist.keys().next().map(String::as_str), Some("a"));
    }
}
