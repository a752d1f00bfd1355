//! One relay invocation: queue event in, partial batch response out.

use std::io::Write;

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::error;

use crate::error::{Error, Result};
use crate::pipeline::{BatchCoordinator, BatchReport, QueueEvent};

/// Read a queue event from `input`, process it, and write the batch
/// response to `output` as a single line.
///
/// The response is always written before a whole-batch failure is
/// reported, so the transport still learns which records to redeliver.
/// Returns [`Error::BatchFailed`] when every record of a non-empty batch
/// failed.
pub async fn run<R, W>(
    coordinator: &BatchCoordinator,
    mut input: R,
    output: &mut W,
) -> Result<BatchReport>
where
    R: AsyncRead + Unpin,
    W: Write,
{
    let mut raw = String::new();
    input.read_to_string(&mut raw).await?;
    let event: QueueEvent = serde_json::from_str(&raw).map_err(Error::MalformedEvent)?;

    let report = coordinator.handle(&event.records).await;

    serde_json::to_writer(&mut *output, &report.response())?;
    writeln!(output)?;
    output.flush()?;

    if report.all_failed() {
        error!(count = report.len(), "Every record in the batch failed");
        return Err(Error::BatchFailed {
            failed: report.len(),
        });
    }
    Ok(report)
}
