//! Batch classification pipeline.
//!
//! Every inbound record flows through:
//! 1. `Item::decode()`: message body → item
//! 2. `ItemProcessor::process()`: zero-shot classification + threshold policy
//! 3. `Notifier::publish()`: only when the item earned a real label
//!
//! `BatchCoordinator` runs each record through these steps in isolation
//! and reports which records need redelivery.

pub mod batch;
pub mod policy;
pub mod processor;
pub mod types;

pub use batch::{BatchCoordinator, BatchReport, BatchResponse, RecordOutcome};
pub use processor::ItemProcessor;
pub use types::{EnrichedItem, InboundMessage, Item, QueueEvent};
