use crate::report::failure::Failure;
use engine_core::stats::improvement_pct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Relative latency change of the target against the source. `Undefined`
/// when the source average is zero or an average is missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Improvement {
    Percent(f64),
    Undefined,
}

impl Improvement {
    pub fn from_averages(source_avg_ms: Option<f64>, target_avg_ms: Option<f64>) -> Self {
        match (source_avg_ms, target_avg_ms) {
            (Some(source), Some(target)) => improvement_pct(source, target)
                .map_or(Improvement::Undefined, Improvement::Percent),
            _ => Improvement::Undefined,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            Improvement::Percent(pct) => Some(*pct),
            Improvement::Undefined => None,
        }
    }
}

/// Serialized as a number, or the string `"undefined"`.
impl Serialize for Improvement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Improvement::Percent(pct) => serializer.serialize_f64(*pct),
            Improvement::Undefined => serializer.serialize_str("undefined"),
        }
    }
}

impl fmt::Display for Improvement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Improvement::Percent(pct) => write!(f, "{pct:+.1}%"),
            Improvement::Undefined => f.write_str("undefined"),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Completed,
    Failed,
    Incomplete,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PerformanceResult {
    pub name: String,
    pub source_avg_ms: Option<f64>,
    pub target_avg_ms: Option<f64>,
    pub improvement: Improvement,
    pub sla_ms: u64,
    pub meets_sla: bool,
    pub source_samples: usize,
    pub target_samples: usize,
    pub status: BenchmarkStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

impl PerformanceResult {
    pub fn completed(
        name: impl Into<String>,
        source_avg_ms: f64,
        target_avg_ms: f64,
        sla_ms: u64,
        samples: (usize, usize),
    ) -> Self {
        PerformanceResult {
            name: name.into(),
            source_avg_ms: Some(source_avg_ms),
            target_avg_ms: Some(target_avg_ms),
            improvement: Improvement::from_averages(Some(source_avg_ms), Some(target_avg_ms)),
            sla_ms,
            meets_sla: target_avg_ms <= sla_ms as f64,
            source_samples: samples.0,
            target_samples: samples.1,
            status: BenchmarkStatus::Completed,
            failure: None,
        }
    }

    /// No averages are reported once any repetition failed.
    pub fn failed(name: impl Into<String>, sla_ms: u64, failure: Failure) -> Self {
        let status = if failure.is_cancellation() {
            BenchmarkStatus::Incomplete
        } else {
            BenchmarkStatus::Failed
        };
        PerformanceResult {
            name: name.into(),
            source_avg_ms: None,
            target_avg_ms: None,
            improvement: Improvement::Undefined,
            sla_ms,
            meets_sla: false,
            source_samples: 0,
            target_samples: 0,
            status,
            failure: Some(failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::failure::{FailureKind, Side};

    #[test]
    fn faster_target_within_sla() {
        let result = PerformanceResult::completed("top_customers", 200.0, 170.0, 180, (5, 5));
        let pct = result.improvement.percent().unwrap();
        assert!((pct - 15.0).abs() < 1e-9);
        assert!(result.meets_sla);
        assert_eq!(result.status, BenchmarkStatus::Completed);
    }

    #[test]
    fn zero_source_average_is_undefined() {
        let result = PerformanceResult::completed("noop", 0.0, 0.0, 10, (5, 5));
        assert_eq!(result.improvement, Improvement::Undefined);
        assert!(result.meets_sla);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["improvement"], "undefined");
    }

    #[test]
    fn sla_is_inclusive() {
        assert!(PerformanceResult::completed("q", 100.0, 50.0, 50, (1, 1)).meets_sla);
        assert!(!PerformanceResult::completed("q", 100.0, 50.5, 50, (1, 1)).meets_sla);
    }

    #[test]
    fn failed_benchmarks_have_no_averages() {
        let failure = Failure::new(FailureKind::Timeout, Side::Target, "query exceeded 1s");
        let result = PerformanceResult::failed("slow", 100, failure);
        assert_eq!(result.source_avg_ms, None);
        assert!(!result.meets_sla);
        assert_eq!(result.status, BenchmarkStatus::Failed);

        let cancelled = PerformanceResult::failed("slow", 100, Failure::cancelled(Side::Source));
        assert_eq!(cancelled.status, BenchmarkStatus::Incomplete);
    }
}
