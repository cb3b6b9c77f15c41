use crate::{env::EnvManager, error::CliError};
use connectors::provider::{ConnectionProvider, DriverProvider};
use model::execution::endpoint::Endpoint;
use tracing::{error, info};

const ENDPOINT_VAR_PREFIX: &str = "PARITY_ENDPOINT_";

/// Turns an endpoint reference into an [`Endpoint`].
///
/// A reference is either a connection URL, used as is and identified by
/// `role`, or a name looked up in `PARITY_ENDPOINT_<NAME>`.
pub fn resolve_endpoint(
    role: &str,
    reference: &str,
    env: &EnvManager,
) -> Result<Endpoint, CliError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(CliError::InvalidEndpoint {
            reference: reference.to_string(),
            reason: "empty reference".to_string(),
        });
    }

    let (id, url) = if reference.contains("://") {
        (role.to_string(), reference.to_string())
    } else {
        let var = endpoint_var(reference);
        let url = env.get(&var).ok_or_else(|| CliError::UnknownEndpoint {
            name: reference.to_string(),
            var: var.clone(),
        })?;
        (reference.to_string(), url.to_string())
    };

    Endpoint::from_url(id, &url).map_err(|reason| CliError::InvalidEndpoint {
        reference: reference.to_string(),
        reason,
    })
}

fn endpoint_var(name: &str) -> String {
    format!(
        "{ENDPOINT_VAR_PREFIX}{}",
        name.to_uppercase().replace('-', "_")
    )
}

/// Opens one connection and runs `SELECT 1` over it.
pub async fn ping(endpoint: &Endpoint) -> Result<(), CliError> {
    info!(endpoint = %endpoint, url = %endpoint.redacted(), "Pinging endpoint");

    let executor = DriverProvider::default()
        .connect(endpoint)
        .await
        .inspect_err(|err| error!(endpoint = %endpoint, %err, "Connection failed"))?;

    executor
        .ping()
        .await
        .inspect_err(|err| error!(endpoint = %endpoint, %err, "Ping query failed"))?;

    info!(endpoint = %endpoint, "Ping succeeded");
    Ok(())
}
