//! # wicket-accesslog
//!
//! The access-logging stage of the wicket gateway.
//!
//! One [`LogRecord`] is created per inbound request and appended to a
//! concurrency-safe [`LogBuffer`]. When the buffer crosses its configured
//! high-water mark, its contents are atomically swapped out and handed to a
//! background drain pipeline that persists the batch through an
//! [`AccessLogSink`]. The request path never waits on storage: the
//! high-water mark bounds staleness, not memory, and a failed batch is
//! logged and discarded rather than surfaced to any client.
//!
//! This crate shares no mutable state with the authentication stage.

pub mod buffer;
pub mod config;
pub mod drain;
pub mod memory;
pub mod postgres;
pub mod record;
pub mod sink;
pub mod stage;

pub use buffer::LogBuffer;
pub use config::{AccessLogConfig, PostgresSinkConfig};
pub use drain::{DrainHandle, spawn_drain_workers};
pub use memory::MemorySink;
pub use postgres::PostgresSink;
pub use record::LogRecord;
pub use sink::{AccessLogSink, DynSink, SinkError};
pub use stage::AccessLogStage;
