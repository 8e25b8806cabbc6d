use crate::catalog::{Catalog, CatalogClient, load_catalog_file};
use crate::config::CatalogConfig;
use crate::download::FetchOptions;
use crate::error::ThumbFetchError;
use std::path::PathBuf;

/// Where the photo listing comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Remote(CatalogConfig),
    File(PathBuf),
}

impl CatalogSource {
    pub async fn load(&self) -> Result<Catalog, ThumbFetchError> {
        match self {
            CatalogSource::Remote(config) => {
                CatalogClient::new(config.clone())?.fetch_catalog().await
            }
            CatalogSource::File(path) => {
                tracing::info!("Loading catalog from {}", path.display());
                load_catalog_file(path)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchParams {
    pub catalog_source: CatalogSource,
    pub base_origin: String,
    pub output_dir: PathBuf,
    pub renditions: Vec<String>,
    pub options: FetchOptions,
    pub fail_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct ListParams {
    pub catalog_source: CatalogSource,
}
