//! Background drain pipeline: a bounded worker pool behind a queue.

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, warn};

use crate::record::LogRecord;
use crate::sink::DynSink;

/// Submission side of the drain pipeline.
///
/// `submit` is fire-and-forget: it never blocks the caller and never
/// surfaces a persistence failure. When the workers are saturated, batches
/// queue on the channel at the cost of staleness, never request latency.
#[derive(Clone)]
pub struct DrainHandle {
    tx: mpsc::UnboundedSender<Vec<LogRecord>>,
}

impl DrainHandle {
    /// Hand a drained batch to the background workers.
    ///
    /// An empty batch (a race between two threshold checks) is a no-op
    /// rather than a degenerate empty write.
    pub fn submit(&self, batch: Vec<LogRecord>) {
        if batch.is_empty() {
            return;
        }
        let rows = batch.len();
        if self.tx.send(batch).is_err() {
            // Workers are gone; shedding the batch is the accepted
            // at-most-once contract.
            warn!(rows, "drain pipeline closed, discarding access log batch");
        }
    }
}

/// Spawn `workers` background tasks persisting batches through `sink` and
/// return the submission handle.
///
/// The workers exit once every handle clone has been dropped and the queue
/// is empty.
pub fn spawn_drain_workers(sink: DynSink, workers: usize) -> DrainHandle {
    let (tx, rx) = mpsc::unbounded_channel::<Vec<LogRecord>>();
    let rx = Arc::new(Mutex::new(rx));

    for worker in 0..workers.max(1) {
        let rx = Arc::clone(&rx);
        let sink = Arc::clone(&sink);
        tokio::spawn(async move {
            loop {
                let batch = { rx.lock().await.recv().await };
                let Some(batch) = batch else { break };

                match sink.insert_batch(&batch).await {
                    Ok(()) => {
                        debug!(worker, rows = batch.len(), "access log batch persisted");
                    }
                    Err(e) => {
                        // Non-fatal to request processing: observe and
                        // discard the batch.
                        error!(
                            worker,
                            rows = batch.len(),
                            error = %e,
                            "failed to persist access log batch, discarding"
                        );
                    }
                }
            }
            debug!(worker, "drain worker stopped");
        });
    }

    DrainHandle { tx }
}
