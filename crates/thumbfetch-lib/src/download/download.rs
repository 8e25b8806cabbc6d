use super::report::collect_reports;
use super::types::{
    DownloadOutcome, DownloadReport, DownloadTask, FetchError, FetchOptions, Rendition, RunSummary,
    UnsupportedRendition,
};
use crate::catalog::AssetDescriptor;
use crate::error::ThumbFetchError;
use crate::utils::{resolve_url, sanitize_file_component};
use futures::stream::{FuturesUnordered, StreamExt};
use itertools::Itertools;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Semaphore;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info, warn};
use url::Url;

/// Creates the output directory (and parents) if it does not exist yet.
pub async fn prepare_output_dir(output_dir: &Path) -> Result<(), ThumbFetchError> {
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| ThumbFetchError::OutputDirectoryCreation {
            path: output_dir.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Downloads the requested renditions of many assets concurrently.
///
/// Each asset is handled by its own future; renditions of one asset are fetched
/// one after another in the requested order. A failure is reported for the
/// (asset, rendition) pair it belongs to and never affects other pairs.
pub struct FetchEngine {
    client: reqwest::Client,
    base_origin: String,
    options: FetchOptions,
}

impl FetchEngine {
    pub fn new(
        base_origin: impl Into<String>,
        options: FetchOptions,
    ) -> Result<Self, ThumbFetchError> {
        let base_origin = base_origin.into();
        Url::parse(&base_origin).map_err(|e| ThumbFetchError::InvalidBaseOrigin {
            origin: base_origin.clone(),
            reason: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_origin,
            options,
        })
    }

    /// Resolves one requested rendition of an asset.
    ///
    /// Returns `Ok(None)` when the asset has no URL for the rendition and an
    /// error when the identifier is not a known rendition.
    pub fn plan(
        &self,
        asset: &AssetDescriptor,
        rendition_id: &str,
        output_dir: &Path,
    ) -> Result<Option<DownloadTask>, UnsupportedRendition> {
        let rendition: Rendition = rendition_id.parse()?;

        let Some(reference) = asset.rendition(rendition.id()) else {
            return Ok(None);
        };
        if reference.is_absent() {
            return Ok(None);
        }

        Ok(Some(DownloadTask {
            asset_code: asset.code.clone(),
            rendition,
            url: resolve_url(&self.base_origin, &reference.url),
            output_path: output_path(output_dir, &asset.code, rendition),
        }))
    }

    /// Processes every asset and waits until each one has attempted or skipped
    /// all of its requested renditions.
    pub async fn run_all(
        &self,
        assets: &[AssetDescriptor],
        rendition_ids: &[String],
        output_dir: &Path,
    ) -> RunSummary {
        let rendition_ids: Vec<&str> = rendition_ids
            .iter()
            .map(String::as_str)
            .unique()
            .collect();
        info!(
            assets = assets.len(),
            renditions = ?rendition_ids,
            max_parallelism = self.options.max_parallelism,
            "Starting downloads"
        );

        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let duplicates = find_duplicate_codes(assets);

        let semaphore = Semaphore::new(
            self.options
                .max_parallelism
                .clamp(1, Semaphore::MAX_PERMITS),
        );

        let mut futs = FuturesUnordered::new();
        for (index, asset) in assets.iter().enumerate() {
            let duplicate = duplicates.contains(&index);
            let report_tx = report_tx.clone();
            let semaphore = &semaphore;
            let rendition_ids = rendition_ids.as_slice();
            futs.push(async move {
                // The semaphore is never closed, so acquiring cannot fail.
                let _permit = semaphore.acquire().await.ok();
                self.process_asset(asset, duplicate, rendition_ids, output_dir, &report_tx)
                    .await;
            });
        }
        drop(report_tx);

        debug!("Waiting for {} asset tasks to finish...", futs.len());
        let drain = async move {
            while futs.next().await.is_some() {}
        };
        let ((), mut summary) = tokio::join!(drain, collect_reports(report_rx));

        summary.assets = assets.len();
        summary
    }

    async fn process_asset(
        &self,
        asset: &AssetDescriptor,
        duplicate: bool,
        rendition_ids: &[&str],
        output_dir: &Path,
        reports: &UnboundedSender<DownloadReport>,
    ) {
        for &rendition_id in rendition_ids {
            let outcome = match self.plan(asset, rendition_id, output_dir) {
                Err(UnsupportedRendition { .. }) => DownloadOutcome::Unsupported,
                Ok(None) => DownloadOutcome::Absent,
                Ok(Some(task)) if duplicate => DownloadOutcome::Duplicate {
                    output_path: task.output_path,
                },
                Ok(Some(task)) => self.execute(task).await,
            };

            // Reports are fire-and-forget; a closed receiver only loses the log line.
            reports
                .send(DownloadReport {
                    asset_code: asset.code.clone(),
                    rendition: rendition_id.to_string(),
                    outcome,
                })
                .ok();
        }
    }

    async fn execute(&self, task: DownloadTask) -> DownloadOutcome {
        info!(
            asset = %task.asset_code,
            rendition = %task.rendition,
            url = %task.url,
            file = %task.output_path.display(),
            "Downloading"
        );

        match self.download_one(&task.url, &task.output_path).await {
            Ok(bytes) => DownloadOutcome::Downloaded {
                output_path: task.output_path,
                bytes,
            },
            Err(error) => DownloadOutcome::Failed {
                output_path: task.output_path,
                error,
            },
        }
    }

    /// Fetches `url` and streams the body into `output_path`, replacing any
    /// existing file. Returns the number of bytes written.
    pub async fn download_one(&self, url: &str, output_path: &Path) -> Result<u64, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                status: status.as_u16(),
            });
        }

        let file = tokio::fs::File::create(output_path)
            .await
            .map_err(|source| FetchError::Io {
                path: output_path.to_path_buf(),
                source,
            })?;
        let mut writer = BufWriter::new(file);

        match stream_body(&mut response, &mut writer, output_path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) => {
                drop(writer);
                remove_partial_file(output_path).await;
                Err(err)
            }
        }
    }
}

/// Indices of assets whose file names collide with an earlier asset's.
///
/// Codes that differ only in characters replaced during sanitizing map to the
/// same output files; only the first such asset in the list is downloaded.
fn find_duplicate_codes(assets: &[AssetDescriptor]) -> HashSet<usize> {
    let mut claimed = HashSet::new();
    assets
        .iter()
        .enumerate()
        .filter(|(_, asset)| !claimed.insert(sanitize_file_component(&asset.code)))
        .map(|(index, asset)| {
            warn!(
                asset = %asset.code,
                "Photo code maps to the same file names as an earlier photo"
            );
            index
        })
        .collect()
}

fn output_path(output_dir: &Path, asset_code: &str, rendition: Rendition) -> PathBuf {
    output_dir.join(format!(
        "{}_{}.jpg",
        sanitize_file_component(asset_code),
        rendition.size_label()
    ))
}

async fn stream_body(
    response: &mut reqwest::Response,
    writer: &mut BufWriter<tokio::fs::File>,
    output_path: &Path,
) -> Result<u64, FetchError> {
    let io_error = |source| FetchError::Io {
        path: output_path.to_path_buf(),
        source,
    };

    let mut written = 0u64;
    while let Some(chunk) = response.chunk().await.map_err(FetchError::Network)? {
        writer.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    writer.flush().await.map_err(io_error)?;

    Ok(written)
}

async fn remove_partial_file(output_path: &Path) {
    if let Err(e) = tokio::fs::remove_file(output_path).await {
        warn!(
            file = %output_path.display(),
            "Failed to remove partial download: {}", e
        );
    } else {
        debug!(file = %output_path.display(), "Removed partial download");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RenditionReference;

    fn engine() -> FetchEngine {
        FetchEngine::new("https://photos.example.com/", FetchOptions::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_base_origin() {
        let result = FetchEngine::new("not a url", FetchOptions::default());
        assert!(matches!(
            result,
            Err(ThumbFetchError::InvalidBaseOrigin { .. })
        ));
    }

    #[test]
    fn test_plan_resolves_url_and_output_path() {
        let asset = AssetDescriptor::new("P1")
            .with_rendition("x1024", RenditionReference::new("/img/p1.jpg", 1024, 768));

        let task = engine()
            .plan(&asset, "x1024", Path::new("out"))
            .unwrap()
            .unwrap();

        assert_eq!(task.asset_code, "P1");
        assert_eq!(task.rendition, Rendition::X1024);
        assert_eq!(task.url, "https://photos.example.com/img/p1.jpg");
        assert_eq!(task.output_path, Path::new("out").join("P1_1024x.jpg"));
    }

    #[test]
    fn test_plan_empty_fragment_is_absent() {
        let asset =
            AssetDescriptor::new("P2").with_rendition("x1024", RenditionReference::new("", 0, 0));

        let planned = engine().plan(&asset, "x1024", Path::new("out")).unwrap();

        assert!(planned.is_none());
    }

    #[test]
    fn test_plan_missing_rendition_is_absent() {
        let asset = AssetDescriptor::new("P3");

        let planned = engine().plan(&asset, "x128", Path::new("out")).unwrap();

        assert!(planned.is_none());
    }

    #[test]
    fn test_plan_unknown_rendition_is_error() {
        let asset = AssetDescriptor::new("P4")
            .with_rendition("x2048", RenditionReference::new("/img/p4.jpg", 2048, 2048));

        let result = engine().plan(&asset, "x2048", Path::new("out"));

        assert_eq!(
            result,
            Err(UnsupportedRendition {
                rendition: "x2048".to_string()
            })
        );
    }

    #[test]
    fn test_plan_sanitizes_asset_code() {
        let asset = AssetDescriptor::new("../P5")
            .with_rendition("x128", RenditionReference::new("/img/p5.jpg", 128, 128));

        let task = engine()
            .plan(&asset, "x128", Path::new("out"))
            .unwrap()
            .unwrap();

        assert_eq!(task.output_path, Path::new("out").join("___P5_128x.jpg"));
    }

    #[tokio::test]
    async fn test_run_all_skips_without_network_calls() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![
            AssetDescriptor::new("P1").with_rendition("x1024", RenditionReference::new("", 0, 0)),
            AssetDescriptor::new("P2"),
        ];
        let renditions = vec!["x1024".to_string(), "bogus".to_string(), "x1024".to_string()];

        let summary = engine().run_all(&assets, &renditions, dir.path()).await;

        assert_eq!(summary.assets, 2);
        assert_eq!(summary.reports.len(), 4);
        assert_eq!(summary.skipped, 4);
        assert_eq!(summary.downloaded + summary.failed, 0);
        assert!(
            summary
                .reports
                .iter()
                .filter(|r| r.rendition == "bogus")
                .all(|r| matches!(r.outcome, DownloadOutcome::Unsupported))
        );
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_find_duplicate_codes_flags_later_collisions() {
        let assets = vec![
            AssetDescriptor::new("P/1"),
            AssetDescriptor::new("P2"),
            AssetDescriptor::new("P_1"),
            AssetDescriptor::new("P2"),
        ];

        let duplicates = find_duplicate_codes(&assets);

        assert_eq!(duplicates, HashSet::from([2, 3]));
    }

    #[tokio::test]
    async fn test_prepare_output_dir_creates_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        prepare_output_dir(&nested).await.unwrap();
        prepare_output_dir(&nested).await.unwrap();

        assert!(nested.is_dir());
    }
}
