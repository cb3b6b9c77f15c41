use chrono::{DateTime, Utc};
use engine_config::{
    report::{
        CatalogRef, EndpointRef, Interruption, ValidationReport,
        integrity::IntegrityResult, performance::PerformanceResult, summary::SummaryReport,
    },
    settings::ValidatorSettings,
};
use engine_core::metrics::MetricsSnapshot;
use model::{catalog::QueryCatalog, execution::endpoint::Endpoint};

/// Collects provenance at run start and turns the phase results into the
/// final report.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    run_id: String,
    started_at: DateTime<Utc>,
    source: EndpointRef,
    target: EndpointRef,
    catalog: CatalogRef,
    settings: ValidatorSettings,
}

impl ReportAssembler {
    pub fn new(
        source: &Endpoint,
        target: &Endpoint,
        catalog: &QueryCatalog,
        settings: &ValidatorSettings,
        started_at: DateTime<Utc>,
    ) -> Self {
        ReportAssembler {
            run_id: make_run_id(source, target, catalog, started_at),
            started_at,
            source: source.into(),
            target: target.into(),
            catalog: catalog.into(),
            settings: settings.clone(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Results are sorted by entry name so identical inputs produce
    /// identical reports apart from timestamps and latencies.
    pub fn assemble(
        self,
        mut integrity: Vec<IntegrityResult>,
        mut performance: Vec<PerformanceResult>,
        interruption: Option<Interruption>,
        metrics: MetricsSnapshot,
    ) -> ValidationReport {
        integrity.sort_by(|a, b| a.name.cmp(&b.name));
        performance.sort_by(|a, b| a.name.cmp(&b.name));
        let summary = SummaryReport::from_results(&integrity, &performance);

        ValidationReport {
            run_id: self.run_id,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            source: self.source,
            target: self.target,
            catalog: self.catalog,
            started_at: self.started_at,
            finished_at: Utc::now(),
            settings: self.settings,
            integrity,
            performance,
            summary,
            interruption,
            metrics,
        }
    }
}

fn make_run_id(
    source: &Endpoint,
    target: &Endpoint,
    catalog: &QueryCatalog,
    started_at: DateTime<Utc>,
) -> String {
    let mut hasher = blake3::Hasher::new();
    for part in [
        source.id.as_str(),
        target.id.as_str(),
        catalog.name.as_str(),
        catalog.version.as_str(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update(b"\0");
    }
    hasher.update(&started_at.timestamp_micros().to_le_bytes());
    hasher.finalize().to_hex()[..16].to_string()
}
