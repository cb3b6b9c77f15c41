pub mod failure;
pub mod integrity;
pub mod performance;
pub mod summary;

use crate::settings::ValidatorSettings;
use chrono::{DateTime, Utc};
use engine_core::metrics::MetricsSnapshot;
use integrity::IntegrityResult;
use model::{
    catalog::QueryCatalog,
    execution::endpoint::{EngineKind, Endpoint},
};
use performance::PerformanceResult;
use serde::Serialize;
use summary::SummaryReport;

/// Identifies an endpoint in a report without exposing its credentials.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EndpointRef {
    pub id: String,
    pub engine: EngineKind,
    pub dialect: String,
}

impl From<&Endpoint> for EndpointRef {
    fn from(endpoint: &Endpoint) -> Self {
        EndpointRef {
            id: endpoint.id.clone(),
            engine: endpoint.engine,
            dialect: endpoint.dialect().to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct CatalogRef {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl From<&QueryCatalog> for CatalogRef {
    fn from(catalog: &QueryCatalog) -> Self {
        CatalogRef {
            name: catalog.name.clone(),
            version: catalog.version.clone(),
            industry: catalog.industry.clone(),
        }
    }
}

/// Why a run stopped before every check finished.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Interruption {
    Timeout,
    Cancelled,
}

/// The final, immutable output of a validation run.
#[derive(Serialize, Debug, Clone)]
pub struct ValidationReport {
    pub run_id: String,
    pub engine_version: String,
    pub source: EndpointRef,
    pub target: EndpointRef,
    pub catalog: CatalogRef,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub settings: ValidatorSettings,
    pub integrity: Vec<IntegrityResult>,
    pub performance: Vec<PerformanceResult>,
    pub summary: SummaryReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption: Option<Interruption>,
    pub metrics: MetricsSnapshot,
}

impl ValidationReport {
    pub fn integrity_result(&self, name: &str) -> Option<&IntegrityResult> {
        self.integrity.iter().find(|r| r.name == name)
    }

    pub fn performance_result(&self, name: &str) -> Option<&PerformanceResult> {
        self.performance.iter().find(|r| r.name == name)
    }
}
