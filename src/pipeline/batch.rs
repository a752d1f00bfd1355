//! Batch coordinator: runs every record of a batch through the pipeline
//! with per-record failure isolation.
//!
//! Per record:
//! `Received → Decoded → Processed → (Published | Skipped) → Succeeded`,
//! or `Failed` at whichever step raised. A failure is recorded against
//! its record and never stops the others. The batch response lists only
//! the failed record ids, so only those get redelivered.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::classifier::HttpClassifier;
use crate::config::RelayConfig;
use crate::error::RecordError;
use crate::notify::{Notifier, create_notifier};
use crate::pipeline::processor::ItemProcessor;
use crate::pipeline::types::{EnrichedItem, InboundMessage, Item};

// ── Outcomes ────────────────────────────────────────────────────────

/// What happened to one record.
#[derive(Debug)]
pub enum RecordOutcome {
    /// Classified and published.
    Published(EnrichedItem),
    /// Classified; not interesting enough to publish.
    Skipped(EnrichedItem),
    /// Empty body. Nothing to do, nothing to redeliver.
    Empty,
    /// Failed at some step. Eligible for redelivery.
    Failed(RecordError),
}

impl RecordOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Published(_) => "published",
            Self::Skipped(_) => "skipped",
            Self::Empty => "empty",
            Self::Failed(_) => "failed",
        }
    }

    pub fn item(&self) -> Option<&EnrichedItem> {
        match self {
            Self::Published(item) | Self::Skipped(item) => Some(item),
            Self::Empty | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&RecordError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Outcome of one record, tagged with its transport id.
#[derive(Debug)]
pub struct RecordReport {
    pub message_id: String,
    pub outcome: RecordOutcome,
}

/// Outcomes for a whole batch, one per input record, in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub records: Vec<RecordReport>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of records that failed, in input order.
    pub fn failed_ids(&self) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| !r.outcome.is_success())
            .map(|r| r.message_id.as_str())
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.records.iter().filter(|r| !r.outcome.is_success()).count()
    }

    pub fn published_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, RecordOutcome::Published(_)))
            .count()
    }

    /// True when the batch had records and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.records.is_empty() && self.failed_count() == self.records.len()
    }

    /// Partial batch response for the transport.
    pub fn response(&self) -> BatchResponse {
        BatchResponse {
            batch_item_failures: self
                .failed_ids()
                .into_iter()
                .map(|id| BatchItemFailure {
                    item_identifier: id.to_string(),
                })
                .collect(),
        }
    }
}

/// Partial batch response: `{"batchItemFailures": [{"itemIdentifier": ...}]}`.
///
/// Records not listed are considered fully processed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

// ── Coordinator ─────────────────────────────────────────────────────

/// Drives a batch through decode → classify → publish.
///
/// Holds the long-lived classifier and notifier handles; build it once
/// and reuse it across batches.
pub struct BatchCoordinator {
    processor: ItemProcessor,
    notifier: Arc<dyn Notifier>,
    concurrency: usize,
}

impl BatchCoordinator {
    /// Create a coordinator that processes records one at a time.
    pub fn new(processor: ItemProcessor, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            processor,
            notifier,
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` records in flight. Report order is unaffected.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Wire up the production classifier and notifier from `config`.
    pub fn from_config(config: &RelayConfig) -> crate::error::Result<Self> {
        let classifier = Arc::new(HttpClassifier::new(&config.classifier)?);
        let processor = ItemProcessor::new(classifier, config.labels.clone(), config.min_score);
        let notifier = create_notifier(&config.notify);
        Ok(Self::new(processor, notifier).with_concurrency(config.batch_concurrency))
    }

    /// Process a batch. Never fails as a whole; see [`BatchReport`].
    pub async fn handle(&self, batch: &[InboundMessage]) -> BatchReport {
        let count = batch.len();
        info!(count, concurrency = self.concurrency, "Processing batch");

        let records: Vec<RecordReport> = stream::iter(batch)
            .map(|message| self.handle_record(message))
            .buffered(self.concurrency)
            .collect()
            .await;

        let report = BatchReport { records };
        info!(
            total = count,
            failed = report.failed_count(),
            published = report.published_count(),
            "Batch processing complete"
        );
        report
    }

    async fn handle_record(&self, message: &InboundMessage) -> RecordReport {
        let outcome = match self.run_record(message).await {
            Ok(outcome) => {
                debug!(id = %message.id, outcome = outcome.label(), "Record succeeded");
                outcome
            }
            Err(e) => {
                error!(id = %message.id, stage = e.label(), error = %e, "Record failed");
                RecordOutcome::Failed(e)
            }
        };

        RecordReport {
            message_id: message.id.clone(),
            outcome,
        }
    }

    async fn run_record(&self, message: &InboundMessage) -> Result<RecordOutcome, RecordError> {
        let body = match message.body.as_deref() {
            Some(body) if !body.is_empty() => body,
            _ => {
                warn!(id = %message.id, "Empty message body, nothing to process");
                return Ok(RecordOutcome::Empty);
            }
        };
        debug!(id = %message.id, body = %body, "Queue message body");

        let item = Item::decode(body)?;
        let enriched = self.processor.process(item).await?;

        if enriched.notification {
            self.notifier.publish(&enriched).await?;
            info!(
                id = %message.id,
                category = %enriched.category_type,
                notifier = self.notifier.name(),
                "Alert published"
            );
            Ok(RecordOutcome::Published(enriched))
        } else {
            info!(id = %message.id, "Will not publish an alert");
            Ok(RecordOutcome::Skipped(enriched))
        }
    }
}
