use async_trait::async_trait;
use connectors::{
    error::{ConnectorError, DbError},
    executor::{QueryExecutor, QueryOutput},
    provider::ConnectionProvider,
};
use model::{
    core::value::Value,
    execution::endpoint::{EngineKind, Endpoint},
    records::row::RowData,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

#[derive(Clone)]
enum Reply {
    Rows(Vec<RowData>),
    Fail(String),
}

#[derive(Clone)]
struct Script {
    reply: Reply,
    /// Reported as the driver round-trip time.
    elapsed: Duration,
    /// Actually slept before answering.
    delay: Duration,
}

/// Scripted answers keyed by query text.
#[derive(Clone, Default)]
pub struct MockDatabase {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    executions: Arc<AtomicUsize>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(self, query: &str, reply: Reply, elapsed: Duration, delay: Duration) -> Self {
        self.scripts.lock().unwrap().insert(
            query.to_string(),
            Script {
                reply,
                elapsed,
                delay,
            },
        );
        self
    }

    pub fn rows(self, query: &str, rows: Vec<RowData>) -> Self {
        self.script(query, Reply::Rows(rows), Duration::from_millis(1), Duration::ZERO)
    }

    pub fn timed(self, query: &str, elapsed: Duration) -> Self {
        self.script(query, Reply::Rows(vec![int_row(1)]), elapsed, Duration::ZERO)
    }

    pub fn slow(self, query: &str, rows: Vec<RowData>, delay: Duration) -> Self {
        self.script(query, Reply::Rows(rows), delay, delay)
    }

    pub fn fail(self, query: &str, message: &str) -> Self {
        self.script(
            query,
            Reply::Fail(message.to_string()),
            Duration::ZERO,
            Duration::ZERO,
        )
    }

    pub fn executions(&self) -> usize {
        self.executions.load(Ordering::SeqCst)
    }
}

struct MockExecutor {
    db: MockDatabase,
    engine: EngineKind,
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, query: &str) -> Result<QueryOutput, DbError> {
        self.db.executions.fetch_add(1, Ordering::SeqCst);
        let script = self.db.scripts.lock().unwrap().get(query).cloned();
        let Some(script) = script else {
            return Err(DbError::Unknown(format!("unscripted query: {query}")));
        };

        if !script.delay.is_zero() {
            tokio::time::sleep(script.delay).await;
        }
        match script.reply {
            Reply::Rows(rows) => Ok(QueryOutput::new(rows, script.elapsed)),
            Reply::Fail(message) => Err(DbError::Unknown(message)),
        }
    }

    fn engine(&self) -> EngineKind {
        self.engine
    }
}

/// Hands out executors over the database registered for each endpoint id.
#[derive(Default)]
pub struct MockProvider {
    databases: HashMap<String, MockDatabase>,
    unreachable: HashSet<String>,
    hanging: HashSet<String>,
    pub connects: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, endpoint_id: &str, db: MockDatabase) -> Self {
        self.databases.insert(endpoint_id.to_string(), db);
        self
    }

    pub fn unreachable(mut self, endpoint_id: &str) -> Self {
        self.unreachable.insert(endpoint_id.to_string());
        self
    }

    /// Connection attempts to this endpoint never complete.
    pub fn hanging(mut self, endpoint_id: &str) -> Self {
        self.hanging.insert(endpoint_id.to_string());
        self
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn QueryExecutor>, ConnectorError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.hanging.contains(&endpoint.id) {
            std::future::pending::<()>().await;
        }
        if self.unreachable.contains(&endpoint.id) {
            return Err(ConnectorError::Unavailable(format!(
                "connection refused: {}",
                endpoint.id
            )));
        }
        let db = self
            .databases
            .get(&endpoint.id)
            .cloned()
            .ok_or_else(|| ConnectorError::Unavailable(format!("no database for {}", endpoint.id)))?;
        Ok(Box::new(MockExecutor {
            db,
            engine: endpoint.engine,
        }))
    }
}

pub fn int_row(value: i64) -> RowData {
    RowData::from_iter([("n".to_string(), Value::Int(value))])
}

pub fn customer(id: i64, name: &str) -> RowData {
    RowData::from_iter([
        ("id".to_string(), Value::Int(id)),
        ("name".to_string(), Value::String(name.to_string())),
    ])
}

pub fn customers(n: i64) -> Vec<RowData> {
    (1..=n).map(|id| customer(id, &format!("customer-{id}"))).collect()
}
