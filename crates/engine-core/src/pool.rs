use crate::{
    error::PoolError,
    metrics::Metrics,
    retry::{RetryError, RetryPolicy},
};
use connectors::{executor::QueryExecutor, provider::ConnectionProvider};
use model::execution::endpoint::Endpoint;
use std::{
    ops::Deref,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info, warn};

/// Connections to one endpoint, held for the lifetime of a run.
///
/// At most `max_size` connections are checked out at once; returned
/// connections are kept idle and handed out again.
pub struct ConnectionPool {
    endpoint: Arc<Endpoint>,
    provider: Arc<dyn ConnectionProvider>,
    retry: RetryPolicy,
    permits: Arc<Semaphore>,
    idle: Mutex<Vec<Box<dyn QueryExecutor>>>,
    metrics: Metrics,
    max_size: usize,
}

impl ConnectionPool {
    pub fn new(
        endpoint: Arc<Endpoint>,
        provider: Arc<dyn ConnectionProvider>,
        max_size: usize,
        retry: RetryPolicy,
        metrics: Metrics,
    ) -> Arc<Self> {
        let max_size = max_size.max(1);
        Arc::new(ConnectionPool {
            endpoint,
            provider,
            retry,
            permits: Arc::new(Semaphore::new(max_size)),
            idle: Mutex::new(Vec::with_capacity(max_size)),
            metrics,
            max_size,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn idle_count(&self) -> usize {
        self.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }

    /// Waits for a free slot, then reuses an idle connection or opens one.
    pub async fn checkout(self: &Arc<Self>) -> Result<PooledConnection, PoolError> {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| PoolError::Closed(self.endpoint.id.clone()))?;

        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let conn = match reused {
            Some(conn) => conn,
            None => self.open().await?,
        };

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(self),
            invalid: false,
            _permit: permit,
        })
    }

    /// Opens one connection and parks it idle. Used as the pre-flight check
    /// before any query runs.
    pub async fn warm_up(self: &Arc<Self>) -> Result<(), PoolError> {
        let conn = self.checkout().await?;
        info!(endpoint = %self.endpoint, engine = %conn.engine(), "Endpoint reachable");
        Ok(())
    }

    /// Rejects further checkouts and drops idle connections.
    pub fn close(&self) {
        self.permits.close();
        if let Ok(mut idle) = self.idle.lock() {
            idle.clear();
        }
    }

    async fn open(&self) -> Result<Box<dyn QueryExecutor>, PoolError> {
        let attempts = AtomicU64::new(0);
        let result = self
            .retry
            .run(
                || {
                    attempts.fetch_add(1, Ordering::Relaxed);
                    self.provider.connect(&self.endpoint)
                },
                RetryPolicy::classify_connect,
            )
            .await;

        let retries = attempts.load(Ordering::Relaxed).saturating_sub(1);
        if retries > 0 {
            self.metrics.increment_retries(retries);
        }

        match result {
            Ok(conn) => {
                self.metrics.increment_connections(1);
                debug!(endpoint = %self.endpoint, "Opened new pooled connection");
                Ok(conn)
            }
            Err(RetryError::Fatal(source)) => Err(PoolError::Connect {
                endpoint: self.endpoint.id.clone(),
                source,
            }),
            Err(RetryError::AttemptsExceeded { attempts, last }) => {
                Err(PoolError::AttemptsExceeded {
                    endpoint: self.endpoint.id.clone(),
                    attempts,
                    source: last,
                })
            }
        }
    }

    fn check_in(&self, conn: Box<dyn QueryExecutor>) {
        if self.permits.is_closed() {
            return;
        }
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }
}

/// A checked-out connection. Returns to the pool on drop unless invalidated.
pub struct PooledConnection {
    conn: Option<Box<dyn QueryExecutor>>,
    pool: Arc<ConnectionPool>,
    invalid: bool,
    _permit: OwnedSemaphorePermit,
}

impl PooledConnection {
    /// Marks the connection broken so it is dropped instead of reused.
    pub fn invalidate(&mut self) {
        if !self.invalid {
            warn!(endpoint = %self.pool.endpoint, "Discarding broken connection");
        }
        self.invalid = true;
    }
}

impl Deref for PooledConnection {
    type Target = dyn QueryExecutor;

    fn deref(&self) -> &Self::Target {
        match &self.conn {
            Some(conn) => conn.as_ref(),
            // `conn` is only taken in `drop`.
            None => unreachable!("pooled connection used after drop"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take()
            && !self.invalid
        {
            self.pool.check_in(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::{
        error::{ConnectorError, DbError},
        executor::QueryOutput,
    };
    use model::execution::endpoint::EngineKind;
    use std::{sync::atomic::AtomicUsize, time::Duration};

    struct StubExecutor;

    #[async_trait]
    impl QueryExecutor for StubExecutor {
        async fn execute(&self, _query: &str) -> Result<QueryOutput, DbError> {
            Ok(QueryOutput::new(Vec::new(), Duration::ZERO))
        }

        fn engine(&self) -> EngineKind {
            EngineKind::Postgres
        }
    }

    /// Fails the first `failures` connects with the error built by `fail`.
    struct StubProvider {
        connects: AtomicUsize,
        failures: usize,
        fail: fn() -> ConnectorError,
    }

    impl StubProvider {
        fn healthy() -> Self {
            Self::failing(0, || ConnectorError::Unavailable("down".into()))
        }

        fn failing(failures: usize, fail: fn() -> ConnectorError) -> Self {
            StubProvider {
                connects: AtomicUsize::new(0),
                failures,
                fail,
            }
        }
    }

    #[async_trait]
    impl ConnectionProvider for StubProvider {
        async fn connect(
            &self,
            _endpoint: &Endpoint,
        ) -> Result<Box<dyn QueryExecutor>, ConnectorError> {
            let n = self.connects.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                return Err((self.fail)());
            }
            Ok(Box::new(StubExecutor))
        }
    }

    fn pool(provider: Arc<StubProvider>, max_size: usize) -> (Arc<ConnectionPool>, Metrics) {
        let endpoint = Arc::new(Endpoint::new(
            "target",
            EngineKind::Postgres,
            "postgres://u:p@localhost/db",
        ));
        let metrics = Metrics::new();
        let retry = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5));
        (
            ConnectionPool::new(endpoint, provider, max_size, retry, metrics.clone()),
            metrics,
        )
    }

    #[tokio::test]
    async fn idle_connections_are_reused() {
        let provider = Arc::new(StubProvider::healthy());
        let (pool, metrics) = pool(provider.clone(), 2);

        pool.warm_up().await.unwrap();
        assert_eq!(pool.idle_count(), 1);

        for _ in 0..5 {
            let conn = pool.checkout().await.unwrap();
            conn.execute("SELECT 1").await.unwrap();
        }

        assert_eq!(provider.connects.load(Ordering::SeqCst), 1);
        assert_eq!(metrics.snapshot().connections_opened, 1);
    }

    #[tokio::test]
    async fn checkouts_are_bounded_by_max_size() {
        let provider = Arc::new(StubProvider::healthy());
        let (pool, _) = pool(provider, 2);

        let first = pool.checkout().await.unwrap();
        let _second = pool.checkout().await.unwrap();

        let blocked = tokio::time::timeout(Duration::from_millis(50), pool.checkout()).await;
        assert!(blocked.is_err(), "third checkout should wait for a free slot");

        drop(first);
        let third = tokio::time::timeout(Duration::from_millis(50), pool.checkout()).await;
        assert!(matches!(third, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn invalidated_connections_are_not_reused() {
        let provider = Arc::new(StubProvider::healthy());
        let (pool, _) = pool(provider.clone(), 1);

        let mut conn = pool.checkout().await.unwrap();
        conn.invalidate();
        drop(conn);
        assert_eq!(pool.idle_count(), 0);

        let _conn = pool.checkout().await.unwrap();
        assert_eq!(provider.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn transient_connect_failures_are_retried() {
        let provider = Arc::new(StubProvider::failing(2, || {
            ConnectorError::Timeout(Duration::from_secs(1))
        }));
        let (pool, metrics) = pool(provider.clone(), 1);

        pool.warm_up().await.unwrap();
        assert_eq!(provider.connects.load(Ordering::SeqCst), 3);
        assert_eq!(metrics.snapshot().connection_retries, 2);
    }

    #[tokio::test]
    async fn fatal_connect_failures_surface_immediately() {
        let provider = Arc::new(StubProvider::failing(usize::MAX, || {
            ConnectorError::InvalidUrl("bad".into())
        }));
        let (pool, _) = pool(provider.clone(), 1);

        let err = pool.warm_up().await.unwrap_err();
        assert!(matches!(err, PoolError::Connect { .. }));
        assert_eq!(err.endpoint(), "target");
        assert_eq!(provider.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_retries_report_attempts() {
        let provider = Arc::new(StubProvider::failing(usize::MAX, || {
            ConnectorError::Unavailable("refused".into())
        }));
        let (pool, _) = pool(provider, 1);

        let err = pool.checkout().await.err().unwrap();
        assert!(matches!(err, PoolError::AttemptsExceeded { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn closed_pool_rejects_checkouts() {
        let provider = Arc::new(StubProvider::healthy());
        let (pool, _) = pool(provider, 1);
        pool.warm_up().await.unwrap();

        pool.close();
        assert_eq!(pool.idle_count(), 0);
        assert!(matches!(pool.checkout().await, Err(PoolError::Closed(_))));
    }
}
