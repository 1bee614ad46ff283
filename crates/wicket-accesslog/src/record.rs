//! The access-log record: one per inbound request, immutable once created.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Metadata captured for one inbound request.
///
/// Created exactly once by the logging stage, never mutated, and consumed
/// exactly once when a drained batch is persisted. Field names match the
/// columns of the `gateway.request` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Remote client address as reported by the gateway.
    pub ip_address: String,
    /// Arrival instant, millisecond precision or finer.
    #[serde(with = "time::serde::rfc3339")]
    pub call_time: OffsetDateTime,
    /// Request path as received.
    pub path: String,
}

impl LogRecord {
    pub fn new(
        ip_address: impl Into<String>,
        call_time: OffsetDateTime,
        path: impl Into<String>,
    ) -> Self {
        Self {
            ip_address: ip_address.into(),
            call_time,
            path: path.into(),
        }
    }

    /// Record with the current instant as its arrival time.
    pub fn now(ip_address: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(ip_address, OffsetDateTime::now_utc(), path)
    }
}
