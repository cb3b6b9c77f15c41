pub mod query;

use query::{BenchmarkQuery, ValidationQuery};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named validation and benchmark definitions for one industry/vertical.
///
/// Entries are keyed by name, so iteration order (and with it the order of
/// the report) is stable across runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryCatalog {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default)]
    pub validations: BTreeMap<String, ValidationQuery>,
    #[serde(default)]
    pub benchmarks: BTreeMap<String, BenchmarkQuery>,
}

fn default_version() -> String {
    "0".to_string()
}

impl QueryCatalog {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        QueryCatalog {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_validation(mut self, name: impl Into<String>, query: ValidationQuery) -> Self {
        self.validations.insert(name.into(), query);
        self
    }

    pub fn with_benchmark(mut self, name: impl Into<String>, query: BenchmarkQuery) -> Self {
        self.benchmarks.insert(name.into(), query);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.validations.is_empty() && self.benchmarks.is_empty()
    }
}
