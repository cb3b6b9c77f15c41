use connectors::error::{ConnectorError, DbError};
use engine_config::{
    error::CatalogError,
    settings::error::SettingsError,
};
use engine_runtime::error::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid endpoint `{reference}`: {reason}")]
    InvalidEndpoint { reference: String, reason: String },

    #[error("Endpoint `{name}` is not defined, set {var} or pass a connection URL")]
    UnknownEndpoint { name: String, var: String },

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to load the query catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Connection check failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Ping query failed: {0}")]
    Ping(#[from] DbError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CliError::Validation(err) if err.is_aborted() => ExitCode::Aborted,
            _ => ExitCode::GeneralError,
        }
    }
}

/// Exit codes of the `parity` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The run was assembled, whatever its findings.
    Success = 0,
    GeneralError = 1,
    /// An endpoint was unreachable, or the run was cut short, before any
    /// query ran.
    Aborted = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_config::report::Interruption;

    #[test]
    fn aborted_runs_exit_with_two() {
        let interrupted = CliError::Validation(ValidationError::Interrupted {
            cause: Interruption::Timeout,
        });
        assert_eq!(interrupted.exit_code(), ExitCode::Aborted);
        assert_eq!(ExitCode::Aborted as u8, 2);
    }

    #[test]
    fn other_failures_exit_with_one() {
        let errors = [
            CliError::Config("bad flag".into()),
            CliError::Catalog(CatalogError::NotFound("retail".into())),
            CliError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "report.json",
            )),
            CliError::UnknownEndpoint {
                name: "staging".into(),
                var: "PARITY_ENDPOINT_STAGING".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.exit_code(), ExitCode::GeneralError, "{err}");
        }
        assert_eq!(ExitCode::Success as u8, 0);
    }
}
