use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThumbFetchError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid command-line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Output directory creation failed at {path}: {reason}")]
    OutputDirectoryCreation { path: PathBuf, reason: String },

    #[error("Invalid base origin {origin}: {reason}")]
    InvalidBaseOrigin { origin: String, reason: String },

    #[error("Failed to request catalog from {endpoint}: {source}")]
    CatalogRequest {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog endpoint {endpoint} responded with status {status}")]
    CatalogStatus { endpoint: String, status: u16 },

    #[error("Failed to decode catalog response: {0}")]
    CatalogDecode(#[source] serde_json::Error),

    #[error("Failed to read catalog file {path}: {reason}")]
    CatalogFile { path: PathBuf, reason: String },

    #[error("{failed} downloads failed")]
    DownloadsFailed { failed: usize },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}
