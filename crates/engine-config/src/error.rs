use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or checking a query catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog `{0}` not found")]
    NotFound(String),

    #[error("Invalid catalog tag `{0}`")]
    InvalidTag(String),

    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Structural problems, one message per offending entry.
    #[error("Catalog `{catalog}` is invalid: {}", problems.join("; "))]
    Invalid {
        catalog: String,
        problems: Vec<String>,
    },
}

/// Errors raised when publishing a report.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Callback request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Callback rejected the report after {attempts} attempts (last status {status})")]
    Rejected { attempts: u32, status: u16 },
}
