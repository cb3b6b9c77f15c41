pub mod error;

use error::SettingsError;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Knobs of a validation run. Durations are milliseconds on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorSettings {
    /// Concurrent integrity checks; also the per-endpoint pool size.
    pub concurrency_limit: usize,
    /// Benchmarks allowed to run at once. Keep at 1 for clean latencies.
    pub benchmark_concurrency: usize,
    /// Run-wide deadline.
    #[serde(with = "opt_millis", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Deadline for a single query execution.
    #[serde(with = "opt_millis", skip_serializing_if = "Option::is_none")]
    pub query_timeout: Option<Duration>,
    /// How long in-flight queries may finish after cancellation.
    #[serde(with = "millis")]
    pub grace_period: Duration,
    pub repetition_count: u32,
    pub warmup_runs: u32,
    pub trim_outliers: bool,
    pub trim_fraction: f64,
    pub connect_retries: u32,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        ValidatorSettings {
            concurrency_limit: 4,
            benchmark_concurrency: 1,
            timeout: None,
            query_timeout: None,
            grace_period: Duration::from_secs(5),
            repetition_count: 5,
            warmup_runs: 0,
            trim_outliers: false,
            trim_fraction: 0.1,
            connect_retries: 3,
        }
    }
}

impl ValidatorSettings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: ValidatorSettings =
            serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.concurrency_limit == 0 {
            return Err(invalid("concurrency_limit", "must be at least 1"));
        }
        if self.benchmark_concurrency == 0 {
            return Err(invalid("benchmark_concurrency", "must be at least 1"));
        }
        if self.repetition_count == 0 {
            return Err(invalid("repetition_count", "must be at least 1"));
        }
        if !(0.0..0.5).contains(&self.trim_fraction) {
            return Err(invalid(
                "trim_fraction",
                format!("{} is outside [0, 0.5)", self.trim_fraction),
            ));
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(invalid("timeout", "must be positive"));
        }
        if self.query_timeout.is_some_and(|t| t.is_zero()) {
            return Err(invalid("query_timeout", "must be positive"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> SettingsError {
    SettingsError::Invalid {
        field,
        reason: reason.into(),
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

mod opt_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let settings = ValidatorSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.concurrency_limit, 4);
        assert_eq!(settings.benchmark_concurrency, 1);
        assert_eq!(settings.repetition_count, 5);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let zero_concurrency = ValidatorSettings {
            concurrency_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_concurrency.validate(),
            Err(SettingsError::Invalid { field: "concurrency_limit", .. })
        ));

        let zero_reps = ValidatorSettings {
            repetition_count: 0,
            ..Default::default()
        };
        assert!(zero_reps.validate().is_err());

        let half = ValidatorSettings {
            trim_fraction: 0.5,
            ..Default::default()
        };
        assert!(matches!(
            half.validate(),
            Err(SettingsError::Invalid { field: "trim_fraction", .. })
        ));
    }

    #[test]
    fn loads_partial_file_with_millisecond_durations() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "concurrency_limit": 8, "timeout": 60000, "grace_period": 250, "trim_outliers": true }}"#
        )
        .unwrap();

        let settings = ValidatorSettings::load(file.path()).unwrap();
        assert_eq!(settings.concurrency_limit, 8);
        assert_eq!(settings.timeout, Some(Duration::from_secs(60)));
        assert_eq!(settings.grace_period, Duration::from_millis(250));
        assert!(settings.trim_outliers);
        assert_eq!(settings.query_timeout, None);
        assert_eq!(settings.repetition_count, 5);
    }

    #[test]
    fn invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = ValidatorSettings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }
}
