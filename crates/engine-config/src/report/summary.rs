use crate::report::{
    integrity::{CheckStatus, IntegrityResult},
    performance::{BenchmarkStatus, PerformanceResult},
};
use serde::Serialize;

#[derive(Serialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct SummaryReport {
    pub checks_total: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub failed: usize,
    pub incomplete: usize,
    pub benchmarks_total: usize,
    pub benchmarks_meeting_sla: usize,
    pub benchmarks_failed: usize,
    pub benchmarks_incomplete: usize,
}

impl SummaryReport {
    pub fn from_results(integrity: &[IntegrityResult], performance: &[PerformanceResult]) -> Self {
        let mut summary = SummaryReport {
            checks_total: integrity.len(),
            benchmarks_total: performance.len(),
            ..Default::default()
        };

        for result in integrity {
            match result.status {
                CheckStatus::Passed => summary.passed += 1,
                CheckStatus::Mismatch => summary.mismatched += 1,
                CheckStatus::Failed => summary.failed += 1,
                CheckStatus::Incomplete => summary.incomplete += 1,
            }
        }

        for result in performance {
            if result.meets_sla {
                summary.benchmarks_meeting_sla += 1;
            }
            match result.status {
                BenchmarkStatus::Completed => {}
                BenchmarkStatus::Failed => summary.benchmarks_failed += 1,
                BenchmarkStatus::Incomplete => summary.benchmarks_incomplete += 1,
            }
        }

        summary
    }

    /// Every check passed and every benchmark met its SLA.
    pub fn is_clean(&self) -> bool {
        self.passed == self.checks_total && self.benchmarks_meeting_sla == self.benchmarks_total
    }
}
