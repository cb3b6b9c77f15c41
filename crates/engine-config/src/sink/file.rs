use crate::{
    error::SinkError,
    report::ValidationReport,
    sink::{MetricsSink, flatten},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::info;

/// Writes the flattened metrics of a report as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink { path: path.into() }
    }
}

#[async_trait]
impl MetricsSink for JsonFileSink {
    async fn publish(&self, report: &ValidationReport) -> Result<(), SinkError> {
        let body = serde_json::to_vec_pretty(&flatten(report))?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| SinkError::Io {
                path: self.path.clone(),
                source,
            })?;
        info!(path = %self.path.display(), "Metrics written");
        Ok(())
    }
}
