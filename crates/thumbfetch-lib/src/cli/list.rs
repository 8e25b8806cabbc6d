use crate::cli::ListParams;
use crate::error::ThumbFetchError;
use tracing;

pub async fn run_list(params: ListParams) -> Result<(), ThumbFetchError> {
    let catalog = params.catalog_source.load().await?;
    tracing::info!("Found {} photos", catalog.assets.len());

    for asset in &catalog.assets {
        let available: Vec<&str> = asset
            .renditions
            .iter()
            .filter(|(_, reference)| !reference.is_absent())
            .map(|(id, _)| id.as_str())
            .collect();
        tracing::info!(asset = %asset.code, renditions = ?available, "Photo");
    }
    Ok(())
}
