//! Latency aggregation for benchmark repetitions.

use std::time::Duration;

/// How repetitions of one benchmark collapse into a single average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Averaging {
    Mean,
    /// Symmetric trimmed mean; drops `fraction` of the samples from each end.
    Trimmed { fraction: f64 },
}

/// Elapsed times recorded for one side of a benchmark.
#[derive(Debug, Clone, Default)]
pub struct LatencySamples {
    samples: Vec<Duration>,
}

impl LatencySamples {
    pub fn with_capacity(capacity: usize) -> Self {
        LatencySamples {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Average in fractional milliseconds; `None` without samples.
    pub fn average_ms(&self, averaging: Averaging) -> Option<f64> {
        if self.samples.is_empty() {
            return None;
        }

        let mut millis: Vec<f64> = self
            .samples
            .iter()
            .map(|d| d.as_nanos() as f64 / 1_000_000.0)
            .collect();

        let kept = match averaging {
            Averaging::Mean => &millis[..],
            Averaging::Trimmed { fraction } => {
                millis.sort_by(f64::total_cmp);
                let drop = trim_count(millis.len(), fraction);
                &millis[drop..millis.len() - drop]
            }
        };

        Some(kept.iter().sum::<f64>() / kept.len() as f64)
    }
}

impl FromIterator<Duration> for LatencySamples {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        LatencySamples {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Samples dropped from each end; always leaves at least one sample.
fn trim_count(len: usize, fraction: f64) -> usize {
    if fraction.is_nan() || fraction <= 0.0 {
        return 0;
    }
    let drop = (len as f64 * fraction).floor() as usize;
    drop.min(len.saturating_sub(1) / 2)
}

/// `(source - target) / source * 100`; positive when the target is faster.
/// `None` when the source average is zero.
pub fn improvement_pct(source_avg_ms: f64, target_avg_ms: f64) -> Option<f64> {
    if source_avg_ms == 0.0 {
        return None;
    }
    Some((source_avg_ms - target_avg_ms) / source_avg_ms * 100.0)
}
