use crate::{checksum, error::ChecksumError, sql::base::error::DbError};
use async_trait::async_trait;
use model::{
    core::digest::Digest, execution::endpoint::EngineKind, records::row::RowData,
};
use std::time::Duration;

/// Rows returned by one query execution, with the time the engine took.
#[derive(Debug, Clone)]
pub struct QueryOutput {
    pub rows: Vec<RowData>,
    pub count: usize,
    /// Driver round-trip (send + fetch of every row); decoding is excluded.
    pub elapsed: Duration,
}

impl QueryOutput {
    pub fn new(rows: Vec<RowData>, elapsed: Duration) -> Self {
        QueryOutput {
            count: rows.len(),
            rows,
            elapsed,
        }
    }
}

/// Uniform execute/measure interface over one live connection to an engine.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, query: &str) -> Result<QueryOutput, DbError>;

    fn engine(&self) -> EngineKind;

    /// Order-independent digest of a result set.
    fn checksum(&self, rows: &[RowData]) -> Result<Digest, ChecksumError> {
        checksum::digest_rows(rows)
    }

    async fn ping(&self) -> Result<(), DbError> {
        let output = self.execute("SELECT 1").await?;
        match output.rows.first().and_then(|row| row.first()) {
            Some(value) if value.as_i64() == Some(1) => Ok(()),
            other => Err(DbError::Unknown(format!(
                "ping returned unexpected result: {other:?}"
            ))),
        }
    }
}
