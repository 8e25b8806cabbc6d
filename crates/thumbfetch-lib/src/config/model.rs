use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_LISTING_ENDPOINT: &str =
    "https://api.disneyphotopass.com.hk/shoppingapi/p/getPhotosByConditions";
pub const DEFAULT_BASE_ORIGIN: &str = "https://www.disneyphotopass.com.hk/";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub download: DownloadConfig,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct CatalogConfig {
    /// Listing endpoint, without query string
    pub endpoint: String,
    /// Access token sent as `tokenId`
    pub token_id: Option<String>,
    pub page_index: u32,
    pub limit: u32,
    pub sort_field: String,
    pub order: i32,
    /// Whole-request timeout for the listing call
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_LISTING_ENDPOINT.to_string(),
            token_id: None,
            page_index: 1,
            limit: 400,
            sort_field: "shootOn".to_string(),
            order: -1,
            timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct DownloadConfig {
    /// Origin prepended to relative rendition URLs
    pub base_origin: String,
    pub output_dir: PathBuf,
    /// Rendition identifiers to fetch, in order
    pub renditions: Vec<String>,
    /// Per-request timeout for rendition downloads
    pub timeout_secs: u64,
    /// Maximum number of assets processed at once
    pub max_parallelism: usize,
    /// Exit with an error if any download failed
    pub fail_on_error: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            base_origin: DEFAULT_BASE_ORIGIN.to_string(),
            output_dir: PathBuf::from("photos"),
            renditions: vec!["x1024".to_string(), "x128".to_string()],
            timeout_secs: 30,
            max_parallelism: 64,
            fail_on_error: false,
        }
    }
}
