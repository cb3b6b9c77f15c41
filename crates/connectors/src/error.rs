pub use crate::sql::base::error::{ConnectorError, DbError};
use thiserror::Error;

/// Raised when a result set cannot be reduced to a canonical digest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChecksumError {
    /// NaN and infinities have no stable cross-engine representation.
    #[error("Column `{column}` holds a non-finite float ({value})")]
    NonFinite { column: String, value: String },

    /// The driver returned a cell it could not decode.
    #[error("Column `{column}` has unsupported type `{type_name}`")]
    Unsupported { column: String, type_name: String },
}
