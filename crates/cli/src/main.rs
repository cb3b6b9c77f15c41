use crate::{
    commands::{CatalogArgs, Commands, ValidateArgs},
    env::EnvManager,
    error::{CliError, ExitCode},
    shutdown::ShutdownCoordinator,
};
use clap::Parser;
use connectors::provider::DriverProvider;
use engine_config::{
    catalog::{CatalogSource, DirectoryCatalog},
    report::ValidationReport,
    sink::{MetricsSink, file::JsonFileSink, http::HttpCallbackSink},
};
use engine_runtime::execution::executor;
use model::catalog::QueryCatalog;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "parity",
    version,
    about = "Validates that a migrated database matches its source"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            error!(error = %err, "parity failed");
            err.exit_code().into()
        }
    }
}

async fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Validate(args) => validate(args).await,
        Commands::TestConn { endpoint, env_file } => {
            let env = EnvManager::load(env_file.as_deref())?;
            let endpoint = conn::resolve_endpoint("endpoint", &endpoint, &env)?;
            conn::ping(&endpoint).await?;
            println!("{endpoint}: OK");
            Ok(())
        }
        Commands::Catalog { catalog } => {
            let env = EnvManager::new();
            let loaded = load_catalog(&catalog, &env).await?;
            println!("{}", serde_json::to_string_pretty(&loaded)?);
            Ok(())
        }
    }
}

async fn load_catalog(args: &CatalogArgs, env: &EnvManager) -> Result<QueryCatalog, CliError> {
    let dir = args.resolve_dir(env.get(CatalogArgs::env_var()))?;
    info!(catalog = %args.catalog, dir = %dir.display(), "Loading query catalog");
    Ok(DirectoryCatalog::new(dir).load(&args.catalog).await?)
}

async fn validate(args: ValidateArgs) -> Result<(), CliError> {
    let env = EnvManager::load(args.env_file.as_deref())?;
    let source = conn::resolve_endpoint("source", &args.source, &env)?;
    let target = conn::resolve_endpoint("target", &args.target, &env)?;
    let settings = args.settings()?;
    let catalog = load_catalog(&args.catalog, &env).await?;

    let shutdown = ShutdownCoordinator::new(CancellationToken::new());
    shutdown.register_handlers();

    let report = executor::run(
        Arc::new(DriverProvider::default()),
        settings,
        Arc::new(source),
        Arc::new(target),
        &catalog,
        shutdown.cancel_token(),
    )
    .await?;

    if shutdown.is_shutdown_requested() {
        warn!("Run was cancelled, the report is partial");
    }

    match &args.output {
        Some(path) => output::write_report(&report, path).await?,
        None => output::print_report(&report)?,
    }

    let mut sinks: Vec<Box<dyn MetricsSink>> = Vec::new();
    if let Some(path) = &args.metrics_file {
        sinks.push(Box::new(JsonFileSink::new(path.clone())));
    }
    let callback_url = args
        .callback_url
        .as_deref()
        .or_else(|| env.get("REPORT_CALLBACK_URL"));
    if let Some(url) = callback_url {
        let token = env.get("AUTH_TOKEN").map(str::to_string);
        sinks.push(Box::new(HttpCallbackSink::new(url, token)));
    }
    publish_metrics(&report, &sinks).await;

    Ok(())
}

/// Delivery to sinks is best effort and never changes the exit code of an
/// assembled run.
async fn publish_metrics(report: &ValidationReport, sinks: &[Box<dyn MetricsSink>]) {
    for sink in sinks {
        if let Err(err) = sink.publish(report).await {
            warn!(run_id = %report.run_id, error = %err, "Failed to publish metrics");
        }
    }
}
