use crate::{
    executor::{QueryExecutor, QueryOutput},
    sql::{
        base::{
            error::{ConnectorError, DbError},
            row::DbRow,
        },
        postgres::utils::connect_client,
    },
};
use async_trait::async_trait;
use model::execution::endpoint::{EngineKind, Endpoint};
use std::time::Instant;
use tokio_postgres::Client;
use tracing::debug;

/// One live PostgreSQL session.
pub struct PgAdapter {
    client: Client,
}

impl PgAdapter {
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectorError> {
        let client = connect_client(endpoint).await?;
        debug!(endpoint = %endpoint, "Postgres session established");
        Ok(PgAdapter { client })
    }
}

#[async_trait]
impl QueryExecutor for PgAdapter {
    async fn execute(&self, query: &str) -> Result<QueryOutput, DbError> {
        let started = Instant::now();
        // Simple-protocol text rows would lose type information, so run
        // through the extended protocol with no parameters.
        let rows = self.client.query(query, &[]).await?;
        let elapsed = started.elapsed();

        let rows = rows
            .iter()
            .map(|row| DbRow::PostgresRow(row).to_row_data())
            .collect();
        Ok(QueryOutput::new(rows, elapsed))
    }

    fn engine(&self) -> EngineKind {
        EngineKind::Postgres
    }
}
