use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a validation query is expected to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    /// A single scalar: the first column of the first row is the count.
    Count,
    /// A row multiset; the count is the number of rows.
    #[default]
    Rows,
    /// A checksum computed by the engine itself; compared like a row multiset.
    Checksum,
}

/// A logical integrity check expressed once per dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationQuery {
    pub source_query: String,
    pub target_query: String,
    #[serde(default)]
    pub shape: ResultShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ValidationQuery {
    pub fn new(
        source_query: impl Into<String>,
        target_query: impl Into<String>,
        shape: ResultShape,
    ) -> Self {
        ValidationQuery {
            source_query: source_query.into(),
            target_query: target_query.into(),
            shape,
            description: None,
        }
    }
}

/// A timed query with the latency the target has to stay under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkQuery {
    pub source_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_query: Option<String>,
    pub sla_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetitions: Option<u32>,
}

impl BenchmarkQuery {
    pub fn new(query: impl Into<String>, sla: Duration) -> Self {
        BenchmarkQuery {
            source_query: query.into(),
            target_query: None,
            sla_ms: sla.as_millis() as u64,
            repetitions: None,
        }
    }

    pub fn with_target_query(mut self, query: impl Into<String>) -> Self {
        self.target_query = Some(query.into());
        self
    }

    pub fn with_repetitions(mut self, repetitions: u32) -> Self {
        self.repetitions = Some(repetitions);
        self
    }

    /// Text run against the target; falls back to the source text when the
    /// query is portable across both dialects.
    pub fn target_text(&self) -> &str {
        self.target_query.as_deref().unwrap_or(&self.source_query)
    }

    pub fn sla(&self) -> Duration {
        Duration::from_millis(self.sla_ms)
    }
}
