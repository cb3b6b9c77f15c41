use crate::{
    executor::{QueryExecutor, QueryOutput},
    sql::{
        base::error::{ConnectorError, DbError},
        mysql::adapter::MySqlAdapter,
        postgres::adapter::PgAdapter,
    },
};
use async_trait::async_trait;
use model::execution::endpoint::{EngineKind, Endpoint};

/// A live session against one endpoint, dispatched on engine kind.
pub enum Adapter {
    MySql(MySqlAdapter),
    Postgres(PgAdapter),
}

impl Adapter {
    pub async fn connect(endpoint: &Endpoint) -> Result<Self, ConnectorError> {
        match endpoint.engine {
            EngineKind::MySql => Ok(Adapter::MySql(MySqlAdapter::connect(endpoint).await?)),
            EngineKind::Postgres => Ok(Adapter::Postgres(PgAdapter::connect(endpoint).await?)),
        }
    }

    fn executor(&self) -> &dyn QueryExecutor {
        match self {
            Adapter::MySql(adapter) => adapter,
            Adapter::Postgres(adapter) => adapter,
        }
    }
}

#[async_trait]
impl QueryExecutor for Adapter {
    async fn execute(&self, query: &str) -> Result<QueryOutput, DbError> {
        self.executor().execute(query).await
    }

    fn engine(&self) -> EngineKind {
        self.executor().engine()
    }
}
