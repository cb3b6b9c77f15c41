use std::time::Duration;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// PostgreSQL driver error.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// MySQL driver error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DbError {
    /// Whether the underlying connection is gone and must not be reused.
    pub fn is_connection_lost(&self) -> bool {
        match self {
            DbError::Postgres(err) => err.is_closed(),
            DbError::MySql(err) => matches!(err, mysql_async::Error::Io(_)),
            _ => false,
        }
    }
}

/// Errors happening while establishing a connection to an endpoint.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection string: {0}")]
    InvalidUrl(String),

    #[error("PostgreSQL connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("MySQL connection failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Connection attempt timed out after {0:?}")]
    Timeout(Duration),

    /// Raised by providers that are not backed by a native driver.
    #[error("Endpoint unavailable: {0}")]
    Unavailable(String),
}

impl ConnectorError {
    /// Transient failures are worth another attempt; configuration and
    /// authentication failures are not.
    pub fn is_transient(&self) -> bool {
        match self {
            ConnectorError::InvalidUrl(_) | ConnectorError::Tls(_) => false,
            ConnectorError::Postgres(err) => err.as_db_error().is_none(),
            ConnectorError::MySql(err) => matches!(err, mysql_async::Error::Io(_)),
            ConnectorError::Timeout(_) | ConnectorError::Unavailable(_) => true,
        }
    }
}
