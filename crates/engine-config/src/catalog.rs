use crate::error::CatalogError;
use async_trait::async_trait;
use model::catalog::QueryCatalog;
use std::{
    collections::BTreeMap,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::info;

/// Supplies the query catalog for an industry/vertical tag.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn load(&self, tag: &str) -> Result<QueryCatalog, CatalogError>;
}

/// Reads `<dir>/<tag>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    dir: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectoryCatalog { dir: dir.into() }
    }

    pub fn path_for(&self, tag: &str) -> Result<PathBuf, CatalogError> {
        let valid = !tag.is_empty()
            && tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !tag.starts_with('.');
        if !valid {
            return Err(CatalogError::InvalidTag(tag.to_string()));
        }
        Ok(self.dir.join(format!("{tag}.json")))
    }
}

#[async_trait]
impl CatalogSource for DirectoryCatalog {
    async fn load(&self, tag: &str) -> Result<QueryCatalog, CatalogError> {
        let path = self.path_for(tag)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(CatalogError::NotFound(tag.to_string()));
            }
            Err(source) => return Err(CatalogError::Io { path, source }),
        };

        let mut catalog = parse_catalog(&content, &path)?;
        if catalog.industry.is_none() {
            catalog.industry = Some(tag.to_string());
        }
        validate_catalog(&catalog)?;

        info!(
            catalog = %catalog.name,
            version = %catalog.version,
            validations = catalog.validations.len(),
            benchmarks = catalog.benchmarks.len(),
            "Loaded query catalog"
        );
        Ok(catalog)
    }
}

/// Catalogs held in memory, keyed by tag. Useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    catalogs: BTreeMap<String, QueryCatalog>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tag: impl Into<String>, catalog: QueryCatalog) -> Self {
        self.catalogs.insert(tag.into(), catalog);
        self
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn load(&self, tag: &str) -> Result<QueryCatalog, CatalogError> {
        let catalog = self
            .catalogs
            .get(tag)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(tag.to_string()))?;
        validate_catalog(&catalog)?;
        Ok(catalog)
    }
}

fn parse_catalog(content: &str, path: &Path) -> Result<QueryCatalog, CatalogError> {
    serde_json::from_str(content).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Structural sanity only: names and query texts are non-empty, SLAs and
/// repetition overrides are positive. Cross-dialect equivalence of the
/// source and target texts is not checked.
pub fn validate_catalog(catalog: &QueryCatalog) -> Result<(), CatalogError> {
    let mut problems = Vec::new();

    if catalog.name.trim().is_empty() {
        problems.push("catalog name is empty".to_string());
    }

    for (name, query) in &catalog.validations {
        if name.trim().is_empty() {
            problems.push("validation with an empty name".to_string());
        }
        if query.source_query.trim().is_empty() {
            problems.push(format!("validation `{name}` has an empty source query"));
        }
        if query.target_query.trim().is_empty() {
            problems.push(format!("validation `{name}` has an empty target query"));
        }
    }

    for (name, bench) in &catalog.benchmarks {
        if name.trim().is_empty() {
            problems.push("benchmark with an empty name".to_string());
        }
        if bench.source_query.trim().is_empty() {
            problems.push(format!("benchmark `{name}` has an empty source query"));
        }
        if bench
            .target_query
            .as_deref()
            .is_some_and(|q| q.trim().is_empty())
        {
            problems.push(format!("benchmark `{name}` has an empty target query"));
        }
        if bench.sla_ms == 0 {
            problems.push(format!("benchmark `{name}` has a zero SLA"));
        }
        if bench.repetitions == Some(0) {
            problems.push(format!("benchmark `{name}` has zero repetitions"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(CatalogError::Invalid {
            catalog: catalog.name.clone(),
            problems,
        })
    }
}
