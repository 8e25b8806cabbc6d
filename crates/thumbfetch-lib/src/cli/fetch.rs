use crate::cli::FetchParams;
use crate::download::{FetchEngine, RunSummary, prepare_output_dir};
use crate::error::ThumbFetchError;
use tracing;

pub async fn run_fetch(params: FetchParams) -> Result<RunSummary, ThumbFetchError> {
    let FetchParams {
        catalog_source,
        base_origin,
        output_dir,
        renditions,
        options,
        fail_on_error,
    } = params;

    let engine = FetchEngine::new(base_origin, options)?;
    prepare_output_dir(&output_dir).await?;

    let catalog = catalog_source.load().await?;
    tracing::info!("Found {} photos to download", catalog.assets.len());

    let summary = engine
        .run_all(&catalog.assets, &renditions, &output_dir)
        .await;

    tracing::info!(
        assets = summary.assets,
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        bytes = summary.bytes,
        "Download summary"
    );
    tracing::info!("All downloads completed!");

    if fail_on_error && summary.failed > 0 {
        return Err(ThumbFetchError::DownloadsFailed {
            failed: summary.failed,
        });
    }
    Ok(summary)
}
