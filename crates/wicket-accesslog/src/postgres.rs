//! PostgreSQL sink: one multi-row insert per drained batch.

use async_trait::async_trait;
use sqlx_core::query_builder::QueryBuilder;
use sqlx_postgres::{PgPool, Postgres};
use tracing::debug;

use crate::config::PostgresSinkConfig;
use crate::record::LogRecord;
use crate::sink::{AccessLogSink, SinkError};

const INSERT_PREFIX: &str = "INSERT INTO gateway.request (ip_address, call_time, path) ";

/// Persists batches into the `gateway.request` table.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a sink with a lazily-connecting pool.
    ///
    /// No connection is attempted until the first batch arrives, so the
    /// gateway can start while the database is still coming up.
    pub fn connect_lazy(config: &PostgresSinkConfig) -> Result<Self, SinkError> {
        let pool = sqlx_postgres::PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_lazy(&config.url)
            .map_err(|e| SinkError::unavailable(e.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl AccessLogSink for PostgresSink {
    async fn insert_batch(&self, batch: &[LogRecord]) -> Result<(), SinkError> {
        let mut query = QueryBuilder::<Postgres>::new(INSERT_PREFIX);
        query.push_values(batch, |mut row, record| {
            row.push_bind(&record.ip_address)
                .push_bind(record.call_time)
                .push_bind(&record.path);
        });

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| SinkError::write_failed(e.to_string()))?;

        debug!(rows = batch.len(), "access log batch inserted");
        Ok(())
    }
}
