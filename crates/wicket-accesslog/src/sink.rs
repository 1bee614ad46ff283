//! Storage-sink abstraction for drained batches.

use std::sync::Arc;

use async_trait::async_trait;

use crate::record::LogRecord;

/// Errors that can occur while persisting a batch.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The batched insert failed as a whole. Per-row partial failure is
    /// not distinguished.
    #[error("Sink write failed: {message}")]
    WriteFailed {
        /// Description of the underlying failure.
        message: String,
    },

    /// The sink could not be constructed from its configuration.
    #[error("Sink unavailable: {message}")]
    Unavailable {
        /// Description of why the sink is unavailable.
        message: String,
    },
}

impl SinkError {
    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::WriteFailed {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// A durable destination for drained access-log batches.
///
/// Implementations must be thread-safe (`Send + Sync`). The sink accepts a
/// variable-length batch in one call and reports success or failure for the
/// batch as a whole; it assigns its own storage order to the rows.
#[async_trait]
pub trait AccessLogSink: Send + Sync {
    /// Persist all records of the batch in a single batched insert.
    async fn insert_batch(&self, batch: &[LogRecord]) -> Result<(), SinkError>;
}

/// Shared, dynamically-dispatched sink handle.
pub type DynSink = Arc<dyn AccessLogSink>;
