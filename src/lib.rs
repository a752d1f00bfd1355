//! Classification relay: reads a queue batch, labels each item with a
//! zero-shot classifier, and forwards the ones that earned a label.

pub mod classifier;
pub mod config;
pub mod error;
pub mod notify;
pub mod pipeline;
pub mod relay;
