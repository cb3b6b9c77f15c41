use crate::sql::base::error::ConnectorError;
use model::execution::endpoint::Endpoint;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_postgres::{Client, Config, Connection, NoTls, config::SslMode};
use tracing::{error, warn};

pub(crate) const DEFAULT_APPLICATION_NAME: &str = "parity";

pub(crate) async fn connect_client(endpoint: &Endpoint) -> Result<Client, ConnectorError> {
    let mut config = endpoint
        .conn_str
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    if config.get_application_name().is_none() {
        let name = endpoint
            .properties
            .get("application_name")
            .map(String::as_str)
            .unwrap_or(DEFAULT_APPLICATION_NAME);
        config.application_name(name);
    }

    match config.get_ssl_mode() {
        SslMode::Disable => connect_without_tls(config).await,
        SslMode::Require => connect_with_tls(config).await,
        SslMode::Prefer => match connect_with_tls(config.clone()).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(endpoint = %endpoint, %error, "Postgres TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

async fn connect_with_tls(config: Config) -> Result<Client, ConnectorError> {
    let tls = MakeTlsConnector::new(TlsConnector::builder().build()?);
    let (client, connection) = config.connect(tls).await?;
    drive(connection);
    Ok(client)
}

async fn connect_without_tls(config: Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    drive(connection);
    Ok(client)
}

/// The connection future performs the actual socket I/O for the client.
fn drive<S, T>(connection: Connection<S, T>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(error) = connection.await {
            error!(%error, "Postgres connection closed with error");
        }
    });
}
