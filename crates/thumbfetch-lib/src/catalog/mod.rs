mod client;
mod types;

pub use client::{CatalogClient, load_catalog_file, parse_catalog};
pub use types::{AssetDescriptor, Catalog, CatalogEnvelope, CatalogResult, RenditionReference};
