use crate::execution::control::RunControl;
use connectors::{error::DbError, executor::QueryOutput};
use engine_config::{
    report::failure::{Failure, FailureKind, Side},
    settings::ValidatorSettings,
};
use engine_core::{
    metrics::Metrics,
    pool::{ConnectionPool, PooledConnection},
};
use std::sync::Arc;
use tracing::debug;

/// Everything a phase needs to run checks against both endpoints.
#[derive(Clone)]
pub struct RunContext {
    pub source: Arc<ConnectionPool>,
    pub target: Arc<ConnectionPool>,
    pub settings: Arc<ValidatorSettings>,
    pub control: RunControl,
    pub metrics: Metrics,
}

impl RunContext {
    pub fn pool(&self, side: Side) -> &Arc<ConnectionPool> {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// Checks out a connection for `side` unless the run is stopping.
    pub async fn checkout(&self, side: Side) -> Result<PooledConnection, Failure> {
        if self.control.is_stopping() {
            return Err(Failure::cancelled(side));
        }

        tokio::select! {
            _ = self.control.abandon_token().cancelled() => Err(Failure::cancelled(side)),
            conn = self.pool(side).checkout() => {
                conn.map_err(|err| Failure::new(FailureKind::Connection, side, err.to_string()))
            }
        }
    }

    /// Executes one query under the per-query timeout. Abandoned when the
    /// grace period after an interruption runs out.
    pub async fn execute(
        &self,
        conn: &mut PooledConnection,
        side: Side,
        query: &str,
    ) -> Result<QueryOutput, Failure> {
        let query_timeout = self.settings.query_timeout;
        let abandon = self.control.abandon_token().clone();

        let finished = tokio::select! {
            _ = abandon.cancelled() => None,
            outcome = async {
                match query_timeout {
                    Some(limit) => tokio::time::timeout(limit, conn.execute(query)).await.ok(),
                    None => Some(conn.execute(query).await),
                }
            } => Some(outcome),
        };

        let Some(outcome) = finished else {
            conn.invalidate();
            return Err(Failure::cancelled(side));
        };

        self.metrics.increment_queries(1);
        match outcome {
            Some(Ok(output)) => {
                debug!(%side, rows = output.count, elapsed = ?output.elapsed, "Query finished");
                Ok(output)
            }
            Some(Err(err)) => {
                self.metrics.increment_failures(1);
                Err(self.db_failure(conn, side, err))
            }
            None => {
                self.metrics.increment_failures(1);
                // The statement may still be running server-side.
                conn.invalidate();
                let limit = query_timeout.unwrap_or_default();
                Err(Failure::new(
                    FailureKind::Timeout,
                    side,
                    format!("query exceeded {limit:?}"),
                ))
            }
        }
    }

    fn db_failure(&self, conn: &mut PooledConnection, side: Side, err: DbError) -> Failure {
        if err.is_connection_lost() {
            conn.invalidate();
            Failure::new(FailureKind::Connection, side, err.to_string())
        } else {
            Failure::new(FailureKind::Query, side, err.to_string())
        }
    }
}
