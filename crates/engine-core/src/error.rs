use crate::state::RunState;
use connectors::error::ConnectorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    #[error("Failed to connect to `{endpoint}`: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: ConnectorError,
    },

    #[error("Failed to connect to `{endpoint}` after {attempts} attempts: {source}")]
    AttemptsExceeded {
        endpoint: String,
        attempts: usize,
        #[source]
        source: ConnectorError,
    },

    #[error("Connection pool for `{0}` is closed")]
    Closed(String),
}

impl PoolError {
    pub fn endpoint(&self) -> &str {
        match self {
            PoolError::Connect { endpoint, .. }
            | PoolError::AttemptsExceeded { endpoint, .. }
            | PoolError::Closed(endpoint) => endpoint,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Illegal run state transition: {from} -> {to}")]
pub struct StateError {
    pub from: RunState,
    pub to: RunState,
}
