pub mod file;
pub mod http;

use crate::{error::SinkError, report::ValidationReport};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Receives finished reports.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn publish(&self, report: &ValidationReport) -> Result<(), SinkError>;
}

/// Flattens a report into dotted keys:
/// `integrity.<name>.counts_match`, `performance.<name>.improvement_pct`,
/// `summary.passed`, ...
pub fn flatten(report: &ValidationReport) -> BTreeMap<String, Value> {
    let mut out = BTreeMap::new();

    out.insert("run.id".into(), json!(report.run_id));
    out.insert("run.engine_version".into(), json!(report.engine_version));
    out.insert("run.source".into(), json!(report.source.id));
    out.insert("run.target".into(), json!(report.target.id));
    out.insert("run.catalog".into(), json!(report.catalog.name));
    out.insert("run.catalog_version".into(), json!(report.catalog.version));
    out.insert("run.started_at".into(), json!(report.started_at.to_rfc3339()));
    out.insert("run.finished_at".into(), json!(report.finished_at.to_rfc3339()));
    if let Some(interruption) = report.interruption {
        out.insert("run.interruption".into(), json!(interruption));
    }

    for result in &report.integrity {
        let key = |field: &str| format!("integrity.{}.{field}", result.name);
        out.insert(key("status"), json!(result.status));
        out.insert(key("counts_match"), json!(result.counts_match));
        out.insert(key("checksums_match"), json!(result.checksums_match));
        out.insert(key("source_count"), json!(result.source_count));
        out.insert(key("target_count"), json!(result.target_count));
        if let Some(failure) = &result.failure {
            out.insert(key("failure"), json!(failure.kind));
        }
    }

    for result in &report.performance {
        let key = |field: &str| format!("performance.{}.{field}", result.name);
        out.insert(key("status"), json!(result.status));
        out.insert(key("source_avg_ms"), json!(result.source_avg_ms));
        out.insert(key("target_avg_ms"), json!(result.target_avg_ms));
        out.insert(key("improvement_pct"), json!(result.improvement));
        out.insert(key("sla_ms"), json!(result.sla_ms));
        out.insert(key("meets_sla"), json!(result.meets_sla));
        if let Some(failure) = &result.failure {
            out.insert(key("failure"), json!(failure.kind));
        }
    }

    if let Value::Object(summary) = json!(report.summary) {
        for (field, value) in summary {
            out.insert(format!("summary.{field}"), value);
        }
    }

    out
}
