use std::path::Path;

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};

use backend_domain::{Catalog, CatalogRepository};

/// Reads the synthetic-data catalog from a YAML override file.
pub struct CatalogFileRepository;

impl CatalogFileRepository {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CatalogFileRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogRepository for CatalogFileRepository {
    async fn load_catalog(&self, path: Option<&str>) -> anyhow::Result<Catalog> {
        let Some(path) = path.filter(|value| !value.trim().is_empty()) else {
            return Ok(Catalog::default());
        };
        if !Path::new(path).exists() {
            warn!(path, "catalog file not found, using built-in catalog");
            return Ok(Catalog::default());
        }
        let content = fs::read_to_string(path).await?;
        let catalog: Catalog = serde_yaml::from_str(&content)?;
        catalog.validate()?;
        info!(
            path,
            merchants = catalog.merchants.len(),
            cities = catalog.cities.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}
