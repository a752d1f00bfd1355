//! Item processor: classifies one item and builds its enriched record.
//!
//! Flow:
//! 1. Zero-shot classification of `item.text` against the candidate labels
//! 2. Threshold policy → assigned label and score
//! 3. Enriched record with the full distribution and the notification flag
//!
//! No I/O of its own beyond the classifier call. Classifier errors are
//! returned unchanged; the batch coordinator decides what they mean.

use std::sync::Arc;

use tracing::{debug, info};

use crate::classifier::ZeroShotClassifier;
use crate::error::ClassificationError;
use crate::pipeline::policy::{decide, should_notify};
use crate::pipeline::types::{EnrichedItem, Item};

/// Classifies items and applies the threshold policy.
pub struct ItemProcessor {
    classifier: Arc<dyn ZeroShotClassifier>,
    labels: Vec<String>,
    threshold: f64,
}

impl ItemProcessor {
    /// Create a new item processor.
    pub fn new(
        classifier: Arc<dyn ZeroShotClassifier>,
        labels: Vec<String>,
        threshold: f64,
    ) -> Self {
        Self {
            classifier,
            labels,
            threshold,
        }
    }

    /// Classify `item` and return its enriched record.
    pub async fn process(&self, item: Item) -> Result<EnrichedItem, ClassificationError> {
        debug!(
            endpoint = self.classifier.endpoint(),
            labels = ?self.labels,
            text = %item.text(),
            "Classifying item"
        );

        let result = self.classifier.classify(item.text(), &self.labels).await?;
        let decision = decide(&result, self.threshold);
        let model_result = result.distribution_json();
        let notification = should_notify(&decision.label);

        info!(
            category = %decision.label,
            score = decision.score,
            best_score = result.score,
            scores = %model_result,
            notification,
            "Item classified"
        );

        Ok(EnrichedItem::new(
            item,
            decision.label,
            decision.score,
            model_result,
            notification,
        ))
    }
}
