use crate::{
    executor::{QueryExecutor, QueryOutput},
    sql::base::{
        error::{ConnectorError, DbError},
        row::DbRow,
    },
};
use async_trait::async_trait;
use model::execution::endpoint::{EngineKind, Endpoint};
use mysql_async::{Conn, Opts, OptsBuilder, Row, prelude::Queryable};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

/// One live MySQL/MariaDB session.
pub struct MySqlAdapter {
    conn: Mutex<Conn>,
}

impl MySqlAdapter {
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectorError> {
        let opts = Opts::from_url(&endpoint.conn_str)
            .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

        let mut builder = OptsBuilder::from_opts(opts);
        if let Some(timezone) = endpoint.properties.get("time_zone") {
            builder = builder.init(vec![format!("SET time_zone = '{timezone}'")]);
        }

        let conn = Conn::new(builder).await?;
        debug!(endpoint = %endpoint, "MySQL session established");
        Ok(MySqlAdapter {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl QueryExecutor for MySqlAdapter {
    async fn execute(&self, query: &str) -> Result<QueryOutput, DbError> {
        let mut conn = self.conn.lock().await;

        let started = Instant::now();
        let rows = conn.query::<Row, _>(query).await?;
        let elapsed = started.elapsed();

        let rows = rows
            .iter()
            .map(|row| DbRow::MySqlRow(row).to_row_data())
            .collect();
        Ok(QueryOutput::new(rows, elapsed))
    }

    fn engine(&self) -> EngineKind {
        EngineKind::MySql
    }
}
