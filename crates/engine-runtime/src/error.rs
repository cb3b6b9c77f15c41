use engine_config::{report::Interruption, settings::error::SettingsError};
use engine_core::error::{PoolError, StateError};
use thiserror::Error;

/// Run-level errors. Per-check failures never surface here; they are
/// recorded on the individual results of the report.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// An endpoint was unreachable before any query ran. No report exists.
    #[error("Run aborted, endpoint `{endpoint}` is unreachable: {source}")]
    Aborted {
        endpoint: String,
        #[source]
        source: PoolError,
    },

    /// The timeout or cancellation fired while the pre-flight connections
    /// were still being opened. No report exists.
    #[error("Run aborted during pre-flight: {cause:?}")]
    Interrupted { cause: Interruption },

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    /// An error occurred while joining a task.
    /// This usually indicates that the task was cancelled or panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

impl ValidationError {
    pub fn is_aborted(&self) -> bool {
        matches!(
            self,
            ValidationError::Aborted { .. } | ValidationError::Interrupted { .. }
        )
    }
}
