use crate::execution::context::RunContext;
use connectors::executor::QueryOutput;
use engine_config::report::{
    failure::{Failure, FailureKind, Side},
    integrity::IntegrityResult,
};
use futures::{StreamExt, stream};
use model::{
    catalog::query::{ResultShape, ValidationQuery},
    core::digest::Digest,
};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// What one side of a check produced.
#[derive(Debug, Default)]
struct SideOutcome {
    count: Option<u64>,
    checksum: Option<Digest>,
    failure: Option<Failure>,
}

impl SideOutcome {
    fn failed(failure: Failure) -> Self {
        SideOutcome {
            failure: Some(failure),
            ..Default::default()
        }
    }
}

/// Runs every validation query, at most `concurrency_limit` at a time.
/// Every requested check is present in the result, ordered by name.
pub async fn run_all(
    ctx: &RunContext,
    validations: &BTreeMap<String, ValidationQuery>,
) -> Vec<IntegrityResult> {
    let limit = ctx.settings.concurrency_limit;
    info!(checks = validations.len(), concurrency = limit, "Starting integrity phase");

    let mut results: BTreeMap<String, IntegrityResult> = stream::iter(validations)
        .map(|(name, query)| async move { (name.clone(), run_check(ctx, name, query).await) })
        .buffer_unordered(limit)
        .collect()
        .await;

    validations
        .keys()
        .map(|name| {
            results.remove(name).unwrap_or_else(|| {
                IntegrityResult::incomplete(name.as_str(), Failure::cancelled(Side::Source))
            })
        })
        .collect()
}

/// Runs one check: both sides concurrently, then an independent count and
/// checksum comparison.
pub async fn run_check(ctx: &RunContext, name: &str, query: &ValidationQuery) -> IntegrityResult {
    if ctx.control.is_stopping() {
        return IntegrityResult::incomplete(name, Failure::cancelled(Side::Source));
    }

    let (source, target) = tokio::join!(
        measure(ctx, Side::Source, &query.source_query, query.shape),
        measure(ctx, Side::Target, &query.target_query, query.shape),
    );

    let failure = pick_failure(source.failure, target.failure);
    let result = IntegrityResult::compare(
        name,
        source.count,
        target.count,
        source.checksum,
        target.checksum,
        failure,
    );

    ctx.metrics.increment_checks();
    match &result.failure {
        Some(failure) => warn!(check = name, status = ?result.status, %failure, "Integrity check did not complete cleanly"),
        None => info!(
            check = name,
            status = ?result.status,
            counts_match = result.counts_match,
            checksums_match = result.checksums_match,
            "Integrity check finished"
        ),
    }
    result
}

async fn measure(ctx: &RunContext, side: Side, query: &str, shape: ResultShape) -> SideOutcome {
    let mut conn = match ctx.checkout(side).await {
        Ok(conn) => conn,
        Err(failure) => return SideOutcome::failed(failure),
    };

    let output = match ctx.execute(&mut conn, side, query).await {
        Ok(output) => output,
        Err(failure) => return SideOutcome::failed(failure),
    };

    let count = match derive_count(&output, shape) {
        Ok(count) => count,
        Err(message) => {
            return SideOutcome::failed(Failure::new(FailureKind::Query, side, message));
        }
    };

    match conn.checksum(&output.rows) {
        Ok(digest) => SideOutcome {
            count: Some(count),
            checksum: Some(digest),
            failure: None,
        },
        Err(err) => SideOutcome {
            count: Some(count),
            checksum: None,
            failure: Some(Failure::new(FailureKind::Checksum, side, err.to_string())),
        },
    }
}

/// `Count` reads the scalar in the first column of the first row; the other
/// shapes count returned rows.
fn derive_count(output: &QueryOutput, shape: ResultShape) -> Result<u64, String> {
    match shape {
        ResultShape::Count => {
            let value = output
                .rows
                .first()
                .and_then(|row| row.first())
                .ok_or_else(|| "count query returned no value".to_string())?;
            value
                .as_count()
                .ok_or_else(|| format!("count query returned `{value}`, expected a non-negative integer"))
        }
        ResultShape::Rows | ResultShape::Checksum => Ok(output.count as u64),
    }
}

/// A real failure outranks a cancellation; otherwise the source side wins.
fn pick_failure(source: Option<Failure>, target: Option<Failure>) -> Option<Failure> {
    match (source, target) {
        (Some(s), Some(t)) if s.is_cancellation() && !t.is_cancellation() => Some(t),
        (Some(s), _) => Some(s),
        (None, t) => t,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::value::Value, records::row::RowData};
    use std::time::Duration;

    fn output(values: Vec<Value>) -> QueryOutput {
        let rows = values
            .into_iter()
            .map(|v| RowData::from_iter([("n".to_string(), v)]))
            .collect();
        QueryOutput::new(rows, Duration::ZERO)
    }

    #[test]
    fn count_shape_reads_first_scalar() {
        assert_eq!(derive_count(&output(vec![Value::Int(1000)]), ResultShape::Count), Ok(1000));
        assert_eq!(
            derive_count(&output(vec![Value::String(" 42 ".into())]), ResultShape::Count),
            Ok(42)
        );
        assert!(derive_count(&output(vec![Value::Int(-1)]), ResultShape::Count).is_err());
        assert!(derive_count(&output(vec![Value::String("many".into())]), ResultShape::Count).is_err());
        assert!(derive_count(&output(vec![]), ResultShape::Count).is_err());
    }

    #[test]
    fn row_shapes_count_rows() {
        let rows = output(vec![Value::Int(7), Value::Int(7), Value::Null]);
        assert_eq!(derive_count(&rows, ResultShape::Rows), Ok(3));
        assert_eq!(derive_count(&rows, ResultShape::Checksum), Ok(3));
    }

    #[test]
    fn real_failures_outrank_cancellation() {
        let cancelled = Failure::cancelled(Side::Source);
        let broken = Failure::new(FailureKind::Query, Side::Target, "boom");
        assert_eq!(
            pick_failure(Some(cancelled.clone()), Some(broken.clone())),
            Some(broken.clone())
        );
        assert_eq!(pick_failure(None, Some(cancelled.clone())), Some(cancelled));
        assert_eq!(pick_failure(Some(broken.clone()), None), Some(broken));
        assert_eq!(pick_failure(None, None), None);
    }
}
