mod loader;
mod model;

pub use loader::load_config;
pub use model::{
    CatalogConfig, Config, DEFAULT_BASE_ORIGIN, DEFAULT_LISTING_ENDPOINT, DownloadConfig,
};
