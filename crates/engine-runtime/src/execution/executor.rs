use crate::{
    error::ValidationError,
    execution::{
        assembler::ReportAssembler, context::RunContext, control::RunControl, integrity,
        performance,
    },
};
use chrono::Utc;
use connectors::provider::ConnectionProvider;
use engine_config::{
    report::{Interruption, ValidationReport},
    settings::ValidatorSettings,
};
use engine_core::{
    metrics::Metrics,
    pool::ConnectionPool,
    retry::RetryPolicy,
    state::{RunState, RunStateMachine},
};
use model::{catalog::QueryCatalog, execution::endpoint::Endpoint};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub async fn run(
    provider: Arc<dyn ConnectionProvider>,
    settings: ValidatorSettings,
    source: Arc<Endpoint>,
    target: Arc<Endpoint>,
    catalog: &QueryCatalog,
    cancel: CancellationToken,
) -> Result<ValidationReport, ValidationError> {
    Validator::new(provider, settings)?
        .validate(source, target, catalog, cancel)
        .await
}

/// Compares a source and a target endpoint against a query catalog.
pub struct Validator {
    provider: Arc<dyn ConnectionProvider>,
    settings: Arc<ValidatorSettings>,
}

impl Validator {
    pub fn new(
        provider: Arc<dyn ConnectionProvider>,
        settings: ValidatorSettings,
    ) -> Result<Self, ValidationError> {
        settings.validate()?;
        Ok(Validator {
            provider,
            settings: Arc::new(settings),
        })
    }

    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Runs the integrity phase, then the performance phase, and assembles
    /// the report. Fails only when the pre-flight connection to an endpoint
    /// fails or is cut short by the timeout or cancellation; every later
    /// failure is recorded in the report.
    pub async fn validate(
        &self,
        source: Arc<Endpoint>,
        target: Arc<Endpoint>,
        catalog: &QueryCatalog,
        cancel: CancellationToken,
    ) -> Result<ValidationReport, ValidationError> {
        let mut state = RunStateMachine::new();
        let metrics = Metrics::new();
        let assembler =
            ReportAssembler::new(&source, &target, catalog, &self.settings, Utc::now());

        info!(
            run_id = assembler.run_id(),
            source = %source,
            target = %target,
            catalog = %catalog.name,
            checks = catalog.validations.len(),
            benchmarks = catalog.benchmarks.len(),
            "Starting validation run"
        );

        let pool_size = self
            .settings
            .concurrency_limit
            .max(self.settings.benchmark_concurrency);
        let retry = RetryPolicy::for_connect(self.settings.connect_retries);
        let source_pool = ConnectionPool::new(
            source.clone(),
            self.provider.clone(),
            pool_size,
            retry.clone(),
            metrics.clone(),
        );
        let target_pool = ConnectionPool::new(
            target.clone(),
            self.provider.clone(),
            pool_size,
            retry,
            metrics.clone(),
        );

        let (control, watcher) =
            RunControl::start(cancel, self.settings.timeout, self.settings.grace_period);

        let preflight = async { tokio::join!(source_pool.warm_up(), target_pool.warm_up()) };
        let ready = tokio::select! {
            biased;
            (source_ready, target_ready) = preflight => source_ready.and(target_ready),
            _ = control.stopped() => {
                control.finish();
                watcher.await?;
                let cause = control.interruption().unwrap_or(Interruption::Cancelled);
                error!(?cause, "Run interrupted during pre-flight, aborting run");
                state.advance(RunState::Aborted)?;
                source_pool.close();
                target_pool.close();
                return Err(ValidationError::Interrupted { cause });
            }
        };

        if let Err(err) = ready {
            error!(endpoint = err.endpoint(), error = %err, "Pre-flight connection failed, aborting run");
            control.finish();
            watcher.await?;
            state.advance(RunState::Aborted)?;
            source_pool.close();
            target_pool.close();
            return Err(ValidationError::Aborted {
                endpoint: err.endpoint().to_string(),
                source: err,
            });
        }

        let ctx = RunContext {
            source: source_pool,
            target: target_pool,
            settings: self.settings.clone(),
            control: control.clone(),
            metrics: metrics.clone(),
        };

        state.advance(RunState::RunningIntegrity)?;
        let integrity = integrity::run_all(&ctx, &catalog.validations).await;

        state.advance(RunState::RunningPerformance)?;
        let performance = performance::run_all(&ctx, &catalog.benchmarks).await;

        control.finish();
        watcher.await?;
        ctx.source.close();
        ctx.target.close();

        state.advance(RunState::Assembled)?;
        let report = assembler.assemble(
            integrity,
            performance,
            control.interruption(),
            metrics.snapshot(),
        );

        info!(
            run_id = %report.run_id,
            passed = report.summary.passed,
            mismatched = report.summary.mismatched,
            failed = report.summary.failed,
            incomplete = report.summary.incomplete,
            benchmarks_meeting_sla = report.summary.benchmarks_meeting_sla,
            interruption = ?report.interruption,
            "Validation run assembled"
        );
        Ok(report)
    }
}
