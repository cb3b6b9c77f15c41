use crate::execution::context::RunContext;
use engine_config::report::{
    failure::{Failure, FailureKind, Side},
    performance::PerformanceResult,
};
use engine_core::stats::{Averaging, LatencySamples};
use futures::{StreamExt, stream};
use model::catalog::query::BenchmarkQuery;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Runs every benchmark, at most `benchmark_concurrency` at a time.
pub async fn run_all(
    ctx: &RunContext,
    benchmarks: &BTreeMap<String, BenchmarkQuery>,
) -> Vec<PerformanceResult> {
    let limit = ctx.settings.benchmark_concurrency;
    info!(benchmarks = benchmarks.len(), concurrency = limit, "Starting performance phase");

    let mut results: BTreeMap<String, PerformanceResult> = stream::iter(benchmarks)
        .map(|(name, bench)| async move { (name.clone(), run_benchmark(ctx, name, bench).await) })
        .buffer_unordered(limit)
        .collect()
        .await;

    benchmarks
        .iter()
        .map(|(name, bench)| {
            results.remove(name).unwrap_or_else(|| {
                PerformanceResult::failed(name.as_str(), bench.sla_ms, Failure::cancelled(Side::Source))
            })
        })
        .collect()
}

/// Times the source first, then the target; each side runs its repetitions
/// sequentially on a single connection.
pub async fn run_benchmark(ctx: &RunContext, name: &str, bench: &BenchmarkQuery) -> PerformanceResult {
    if ctx.control.is_stopping() {
        return PerformanceResult::failed(name, bench.sla_ms, Failure::cancelled(Side::Source));
    }

    let repetitions = bench.repetitions.unwrap_or(ctx.settings.repetition_count);
    let outcome = async {
        let source = sample(ctx, Side::Source, &bench.source_query, repetitions).await?;
        let target = sample(ctx, Side::Target, bench.target_text(), repetitions).await?;
        Ok::<_, Failure>((source, target))
    }
    .await;

    ctx.metrics.increment_benchmarks();
    let (source, target) = match outcome {
        Ok(samples) => samples,
        Err(failure) => {
            warn!(benchmark = name, %failure, "Benchmark failed");
            return PerformanceResult::failed(name, bench.sla_ms, failure);
        }
    };

    let averaging = averaging(ctx);
    let (Some(source_avg), Some(target_avg)) =
        (source.average_ms(averaging), target.average_ms(averaging))
    else {
        return PerformanceResult::failed(
            name,
            bench.sla_ms,
            Failure::new(FailureKind::Query, Side::Source, "benchmark recorded no samples"),
        );
    };

    let result = PerformanceResult::completed(
        name,
        source_avg,
        target_avg,
        bench.sla_ms,
        (source.len(), target.len()),
    );
    info!(
        benchmark = name,
        source_avg_ms = source_avg,
        target_avg_ms = target_avg,
        improvement = %result.improvement,
        meets_sla = result.meets_sla,
        "Benchmark finished"
    );
    result
}

fn averaging(ctx: &RunContext) -> Averaging {
    if ctx.settings.trim_outliers {
        Averaging::Trimmed {
            fraction: ctx.settings.trim_fraction,
        }
    } else {
        Averaging::Mean
    }
}

async fn sample(
    ctx: &RunContext,
    side: Side,
    query: &str,
    repetitions: u32,
) -> Result<LatencySamples, Failure> {
    let mut conn = ctx.checkout(side).await?;

    for _ in 0..ctx.settings.warmup_runs {
        ctx.execute(&mut conn, side, query).await?;
    }

    let mut samples = LatencySamples::with_capacity(repetitions as usize);
    for run in 0..repetitions {
        let output = ctx.execute(&mut conn, side, query).await?;
        debug!(%side, run, elapsed = ?output.elapsed, "Benchmark repetition");
        samples.record(output.elapsed);
    }
    Ok(samples)
}
