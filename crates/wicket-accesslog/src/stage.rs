//! The per-request logging stage: append, check the mark, trigger a drain.

use crate::buffer::LogBuffer;
use crate::drain::DrainHandle;
use crate::record::LogRecord;

/// The access-logging stage as seen by the gateway pipeline.
///
/// An explicitly owned, injected component: the buffer, the high-water
/// mark, and the drain handle are constructed dependencies, not ambient
/// state, so the stage and its background pipeline are testable in
/// isolation.
pub struct AccessLogStage {
    buffer: LogBuffer,
    high_water_mark: usize,
    drain: DrainHandle,
}

impl AccessLogStage {
    pub fn new(high_water_mark: usize, drain: DrainHandle) -> Self {
        Self {
            buffer: LogBuffer::new(),
            high_water_mark: high_water_mark.max(1),
            drain,
        }
    }

    /// Record one inbound request.
    ///
    /// Appends a freshly-stamped record, then performs the best-effort
    /// threshold check: at or above the high-water mark, the buffer is
    /// swapped empty and the batch handed to the background pipeline.
    /// Never waits on the storage sink.
    pub fn record(&self, ip_address: impl Into<String>, path: impl Into<String>) {
        let len = self.buffer.append(LogRecord::now(ip_address, path));
        if len >= self.high_water_mark {
            self.drain.submit(self.buffer.drain_all());
        }
    }

    /// Drain whatever is buffered right now, regardless of the mark.
    pub fn flush(&self) {
        self.drain.submit(self.buffer.drain_all());
    }

    /// Remove and return everything buffered, bypassing the pipeline.
    ///
    /// Shutdown path: the caller persists the batch itself and can await
    /// the write, instead of racing the background workers against
    /// runtime teardown.
    pub fn drain_now(&self) -> Vec<LogRecord> {
        self.buffer.drain_all()
    }

    /// Records currently staged (drained batches excluded).
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
