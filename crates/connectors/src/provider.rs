use crate::{adapter::Adapter, executor::QueryExecutor, sql::base::error::ConnectorError};
use async_trait::async_trait;
use model::execution::endpoint::Endpoint;
use std::time::Duration;
use tracing::debug;

/// Opens connections to endpoints. The validator only ever talks to
/// databases through executors handed out by a provider.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn QueryExecutor>, ConnectorError>;
}

/// Connects through the native drivers.
#[derive(Debug, Clone)]
pub struct DriverProvider {
    connect_timeout: Duration,
}

impl DriverProvider {
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(connect_timeout: Duration) -> Self {
        DriverProvider { connect_timeout }
    }
}

impl Default for DriverProvider {
    fn default() -> Self {
        DriverProvider::new(Self::DEFAULT_CONNECT_TIMEOUT)
    }
}

#[async_trait]
impl ConnectionProvider for DriverProvider {
    async fn connect(&self, endpoint: &Endpoint) -> Result<Box<dyn QueryExecutor>, ConnectorError> {
        debug!(endpoint = %endpoint, url = %endpoint.redacted(), "Opening connection");
        let adapter = tokio::time::timeout(self.connect_timeout, Adapter::connect(endpoint))
            .await
            .map_err(|_| ConnectorError::Timeout(self.connect_timeout))??;
        Ok(Box::new(adapter))
    }
}
