use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    queries_executed: AtomicU64,
    query_failures: AtomicU64,
    connections_opened: AtomicU64,
    connection_retries: AtomicU64,
    checks_completed: AtomicU64,
    benchmarks_completed: AtomicU64,
}

/// Run-wide counters shared by every worker of a run.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub query_failures: u64,
    pub connections_opened: u64,
    pub connection_retries: u64,
    pub checks_completed: u64,
    pub benchmarks_completed: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_queries(&self, count: u64) {
        self.inner
            .queries_executed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.query_failures.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_connections(&self, count: u64) {
        self.inner
            .connections_opened
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_retries(&self, count: u64) {
        self.inner
            .connection_retries
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_checks(&self) {
        self.inner.checks_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_benchmarks(&self) {
        self.inner
            .benchmarks_completed
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.inner.queries_executed.load(Ordering::Relaxed),
            query_failures: self.inner.query_failures.load(Ordering::Relaxed),
            connections_opened: self.inner.connections_opened.load(Ordering::Relaxed),
            connection_retries: self.inner.connection_retries.load(Ordering::Relaxed),
            checks_completed: self.inner.checks_completed.load(Ordering::Relaxed),
            benchmarks_completed: self.inner.benchmarks_completed.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
