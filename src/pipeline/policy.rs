//! Confidence threshold policy.
//!
//! A result keeps its best label only when the winning score is strictly
//! above the threshold. Otherwise the item is filed under [`FALLBACK_LABEL`]
//! and its reported score is scrubbed to zero, so a downstream reader
//! can't mistake "not confident" for "moderately confident". The full
//! distribution is kept on the item either way.

use crate::classifier::ClassificationResult;

/// Label assigned when no candidate clears the threshold.
pub const FALLBACK_LABEL: &str = "other";

/// Threshold decision for one classification result.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub label: String,
    pub score: f64,
}

/// Apply `threshold` to `result`.
pub fn decide(result: &ClassificationResult, threshold: f64) -> Decision {
    if result.score > threshold {
        Decision {
            label: result.label.clone(),
            score: result.score,
        }
    } else {
        Decision {
            label: FALLBACK_LABEL.to_string(),
            score: 0.0,
        }
    }
}

/// Whether an item with this assigned label should be published.
pub fn should_notify(label: &str) -> bool {
    label != FALLBACK_LABEL
}
