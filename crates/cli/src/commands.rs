use crate::error::CliError;
use clap::{Args, Subcommand};
use engine_config::settings::ValidatorSettings;
use std::{path::PathBuf, time::Duration};

const CATALOG_DIR_VAR: &str = "PARITY_CATALOG_DIR";

#[derive(Subcommand)]
pub enum Commands {
    /// Compare a source and a target endpoint against a query catalog
    Validate(ValidateArgs),

    /// Ping an endpoint with `SELECT 1`
    TestConn {
        /// Connection URL or endpoint name (resolved from PARITY_ENDPOINT_<NAME>)
        #[arg(long)]
        endpoint: String,

        #[arg(long, help = "Load environment variables from this .env file")]
        env_file: Option<PathBuf>,
    },

    /// Print a query catalog as JSON
    Catalog {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Industry/vertical tag of the catalog
    #[arg(long)]
    pub catalog: String,

    #[arg(
        long,
        help = "Directory holding <catalog>.json files (defaults to $PARITY_CATALOG_DIR, then ~/.parity/catalogs)"
    )]
    pub catalog_dir: Option<PathBuf>,
}

impl CatalogArgs {
    pub fn resolve_dir(&self, env_dir: Option<&str>) -> Result<PathBuf, CliError> {
        if let Some(dir) = &self.catalog_dir {
            return Ok(dir.clone());
        }
        if let Some(dir) = env_dir {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not determine home directory".into()))?;
        Ok(home.join(".parity").join("catalogs"))
    }

    pub fn env_var() -> &'static str {
        CATALOG_DIR_VAR
    }
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Source endpoint: connection URL or endpoint name
    #[arg(long)]
    pub source: String,

    /// Target endpoint: connection URL or endpoint name
    #[arg(long)]
    pub target: String,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    #[arg(long, help = "Maximum number of integrity checks running at once")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Run-wide timeout in seconds")]
    pub timeout: Option<f64>,

    #[arg(long, help = "Per-query timeout in seconds")]
    pub query_timeout: Option<f64>,

    #[arg(long, help = "Timed repetitions per benchmark")]
    pub repetitions: Option<u32>,

    #[arg(long, help = "Average benchmarks with a trimmed mean")]
    pub trim_outliers: bool,

    #[arg(long, help = "JSON settings file; flags override its values")]
    pub settings: Option<PathBuf>,

    #[arg(long, help = "Load environment variables from this .env file")]
    pub env_file: Option<PathBuf>,

    #[arg(
        long,
        help = "If specified, writes the JSON report to this file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Write the flattened metrics to this JSON file")]
    pub metrics_file: Option<PathBuf>,

    #[arg(long, help = "POST the report to this URL (bearer token from AUTH_TOKEN)")]
    pub callback_url: Option<String>,
}

impl ValidateArgs {
    /// Settings file (or defaults) with command-line overrides applied.
    pub fn settings(&self) -> Result<ValidatorSettings, CliError> {
        let mut settings = match &self.settings {
            Some(path) => ValidatorSettings::load(path)?,
            None => ValidatorSettings::default(),
        };

        if let Some(concurrency) = self.concurrency {
            settings.concurrency_limit = concurrency;
        }
        if let Some(secs) = self.timeout {
            settings.timeout = Some(seconds("--timeout", secs)?);
        }
        if let Some(secs) = self.query_timeout {
            settings.query_timeout = Some(seconds("--query-timeout", secs)?);
        }
        if let Some(repetitions) = self.repetitions {
            settings.repetition_count = repetitions;
        }
        if self.trim_outliers {
            settings.trim_outliers = true;
        }

        settings.validate()?;
        Ok(settings)
    }
}

fn seconds(flag: &str, secs: f64) -> Result<Duration, CliError> {
    Duration::try_from_secs_f64(secs)
        .ok()
        .filter(|d| !d.is_zero())
        .ok_or_else(|| CliError::Config(format!("{flag} must be a positive number of seconds")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cli;
    use clap::Parser;
    use std::io::Write;

    fn validate_args(extra: &[&str]) -> ValidateArgs {
        let mut argv = vec![
            "parity",
            "validate",
            "--source",
            "mysql://u:p@src/db",
            "--target",
            "pg-target",
            "--catalog",
            "ecommerce",
        ];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Validate(args) => args,
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn defaults_without_flags() {
        let settings = validate_args(&[]).settings().unwrap();
        assert_eq!(settings, ValidatorSettings::default());
    }

    #[test]
    fn flags_override_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"concurrency_limit": 8, "repetition_count": 10, "warmup_runs": 2}}"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let settings = validate_args(&[
            "--settings",
            &path,
            "--repetitions",
            "3",
            "--timeout",
            "1.5",
            "--trim-outliers",
        ])
        .settings()
        .unwrap();

        assert_eq!(settings.concurrency_limit, 8);
        assert_eq!(settings.warmup_runs, 2);
        assert_eq!(settings.repetition_count, 3);
        assert_eq!(settings.timeout, Some(Duration::from_millis(1_500)));
        assert!(settings.trim_outliers);
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        assert!(validate_args(&["--concurrency", "0"]).settings().is_err());
        assert!(validate_args(&["--query-timeout", "0"]).settings().is_err());
        assert!(validate_args(&["--timeout=-3"]).settings().is_err());
    }

    #[test]
    fn catalog_dir_precedence() {
        let args = validate_args(&["--catalog-dir", "/srv/catalogs"]);
        assert_eq!(
            args.catalog.resolve_dir(Some("/env/dir")).unwrap(),
            PathBuf::from("/srv/catalogs")
        );

        let args = validate_args(&[]);
        assert_eq!(
            args.catalog.resolve_dir(Some("/env/dir")).unwrap(),
            PathBuf::from("/env/dir")
        );
    }
}
