use std::path::PathBuf;

use crate::domain::model::catalog::Catalog;
use crate::domain::repository::CatalogRepository;

#[derive(Debug, thiserror::Error)]
pub enum JsonStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSONファイルによるCatalogRepository実装。
/// カタログ全体を1つの配列として保存し、書き込みは毎回全体を置き換える。
pub struct JsonCatalogRepository {
    path: PathBuf,
}

impl JsonCatalogRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogRepository for JsonCatalogRepository {
    type Error = JsonStoreError;

    fn load(&self) -> Result<Option<Catalog>, Self::Error> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "catalog file not found");
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let catalog: Catalog = serde_json::from_str(&content)?;
        Ok(Some(catalog))
    }

    fn save(&self, catalog: &Catalog) -> Result<(), Self::Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(catalog)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, &content)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), books = catalog.len(), "catalog written");
        Ok(())
    }
}
