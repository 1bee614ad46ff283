//! In-memory sink for tests and sink-less deployments.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::record::LogRecord;
use crate::sink::{AccessLogSink, SinkError};

/// Vec-backed sink. Rows are appended in batch order and kept forever.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything persisted so far.
    pub fn rows(&self) -> Vec<LogRecord> {
        self.rows.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }
}

#[async_trait]
impl AccessLogSink for MemorySink {
    async fn insert_batch(&self, batch: &[LogRecord]) -> Result<(), SinkError> {
        self.rows.lock().extend_from_slice(batch);
        Ok(())
    }
}
