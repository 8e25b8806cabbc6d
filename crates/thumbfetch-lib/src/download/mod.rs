#[allow(clippy::module_inception)]
mod download;
mod report;
mod types;

pub use download::{FetchEngine, prepare_output_dir};
pub use types::{
    DownloadOutcome, DownloadReport, DownloadTask, FetchError, FetchOptions, Rendition, RunSummary,
    UnsupportedRendition,
};
