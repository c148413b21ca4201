/// Catalog loading trait and implementations
///
/// Catalog sources are fetched by name through [`CatalogLoader`], then parsed
/// and validated by [`load_catalog`].
use async_trait::async_trait;
use std::collections::HashMap;
#[cfg(feature = "folder-loader")]
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

#[cfg(feature = "builtin-catalog")]
use crate::builtin_catalog;
use crate::catalog::Catalog;
use crate::KaraokeError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("Catalog not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Async source of catalog text
#[async_trait]
pub trait CatalogLoader: Send + Sync {
    /// Load the source text of the catalog called `name`
    async fn load(&self, name: &str) -> Result<String, LoadError>;
}

/// Fetch, parse and validate a catalog
pub async fn load_catalog(
    loader: &dyn CatalogLoader,
    name: &str,
) -> Result<Arc<Catalog>, KaraokeError> {
    let source = loader.load(name).await?;
    let catalog = crate::parse_catalog(&source)?;
    log::debug!(
        "loaded catalog '{}': {} categories, {} special prompts",
        name,
        catalog.categories().len(),
        catalog.specials().len()
    );
    Ok(Arc::new(catalog))
}

/// Loads catalogs from a directory
///
/// A name resolves to `<name>.catalog`, then to `<name>` itself.
#[cfg(feature = "folder-loader")]
pub struct FolderLoader {
    base_path: PathBuf,
}

#[cfg(feature = "folder-loader")]
impl FolderLoader {
    /// # Example
    /// ```no_run
    /// use karaoke_prompts::loader::FolderLoader;
    /// use std::path::PathBuf;
    ///
    /// let loader = FolderLoader::new(PathBuf::from("./catalogs"));
    /// ```
    pub fn new(base_path: PathBuf) -> Self {
        FolderLoader { base_path }
    }
}

#[cfg(feature = "folder-loader")]
#[async_trait]
impl CatalogLoader for FolderLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        // Strip anything that could leave the base directory
        let sanitized = name.replace("..", "").replace(['/', '\\'], "");
        if sanitized.is_empty() {
            return Err(LoadError::InvalidPath(name.to_string()));
        }

        let paths = [
            self.base_path.join(format!("{}.catalog", sanitized)),
            self.base_path.join(&sanitized),
        ];
        for path in paths {
            match tokio::fs::read_to_string(&path).await {
                Ok(content) => return Ok(content),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(LoadError::IoError(e.to_string())),
            }
        }

        Err(LoadError::NotFound(name.to_string()))
    }
}

/// In-memory catalog store
#[derive(Clone, Default)]
pub struct InMemoryLoader {
    catalogs: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Example
    /// ```
    /// use karaoke_prompts::loader::InMemoryLoader;
    ///
    /// let loader = InMemoryLoader::new();
    /// loader.add("party", "era\n\t90s\n\tfree\n$special\n\tShout\n");
    /// ```
    pub fn add(&self, name: impl Into<String>, source: impl Into<String>) {
        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), source.into());
    }

    pub fn remove(&self, name: &str) -> bool {
        self.catalogs
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.catalogs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }
}

#[async_trait]
impl CatalogLoader for InMemoryLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        self.catalogs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}

/// Serves the catalogs compiled into the crate
#[cfg(feature = "builtin-catalog")]
#[derive(Clone, Default)]
pub struct BuiltinCatalogLoader;

#[cfg(feature = "builtin-catalog")]
impl BuiltinCatalogLoader {
    pub fn new() -> Self {
        BuiltinCatalogLoader
    }

    pub fn list_available(&self) -> Vec<String> {
        builtin_catalog::CATALOGS
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }
}

#[cfg(feature = "builtin-catalog")]
#[async_trait]
impl CatalogLoader for BuiltinCatalogLoader {
    async fn load(&self, name: &str) -> Result<String, LoadError> {
        builtin_catalog::CATALOGS
            .iter()
            .find(|(catalog_name, _)| *catalog_name == name)
            .map(|(_, content)| content.to_string())
            .ok_or_else(|| LoadError::NotFound(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_round_trip() {
        let loader = InMemoryLoader::new();
        loader.add("party", "A\n\ta1\n\tfree\n$special\n\ts1\n");
        assert!(loader.contains("party"));

        let catalog = load_catalog(&loader, "party").await.unwrap();
        assert_eq!(catalog.specials(), ["s1"]);

        assert!(loader.remove("party"));
        assert!(!loader.remove("party"));
    }

    #[tokio::test]
    async fn test_not_found() {
        let loader = InMemoryLoader::new();
        let result = loader.load("missing").await;
        assert_eq!(result, Err(LoadError::NotFound("missing".to_string())));

        let err = load_catalog(&loader, "missing").await.unwrap_err();
        assert!(matches!(err, KaraokeError::Load(_)));
    }

    #[tokio::test]
    async fn test_invalid_source_is_parse_error() {
        let loader = InMemoryLoader::new();
        loader.add("broken", "A\n\ta1\n$special\n\ts1\n");
        let err = load_catalog(&loader, "broken").await.unwrap_err();
        assert!(matches!(err, KaraokeError::Parse(_)));
    }

    #[cfg(feature = "folder-loader")]
    #[tokio::test]
    async fn test_folder_loader_reads_file() {
        let dir = std::env::temp_dir().join(format!("karaoke-prompts-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("party.catalog"), "A\n\ta1\n\tfree\n$special\n\ts1\n")
            .await
            .unwrap();

        let loader = FolderLoader::new(dir.clone());
        let catalog = load_catalog(&loader, "party").await.unwrap();
        assert_eq!(catalog.categories()[0].name(), "A");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[cfg(feature = "folder-loader")]
    #[tokio::test]
    async fn test_folder_loader_path_traversal_protection() {
        let loader = FolderLoader::new(PathBuf::from("/nonexistent"));
        assert!(matches!(
            loader.load("../etc/passwd").await,
            Err(LoadError::NotFound(_))
        ));
        assert!(matches!(
            loader.load("../..").await,
            Err(LoadError::InvalidPath(_))
        ));
    }

    #[cfg(feature = "builtin-catalog")]
    #[tokio::test]
    async fn test_builtin_default_is_valid() {
        let loader = BuiltinCatalogLoader::new();
        assert_eq!(loader.list_available(), ["default"]);
        let catalog = load_catalog(&loader, "default").await.unwrap();
        assert_eq!(catalog.categories().len(), 3);
        assert_eq!(catalog.specials().len(), 27);
    }
}
