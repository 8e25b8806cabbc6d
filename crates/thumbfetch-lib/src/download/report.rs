use super::types::{DownloadOutcome, DownloadReport, RunSummary};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Drains outcome reports until every sender is gone, logging each one.
pub(crate) async fn collect_reports(mut reports: UnboundedReceiver<DownloadReport>) -> RunSummary {
    let mut summary = RunSummary::default();
    while let Some(report) = reports.recv().await {
        log_report(&report);
        summary.record(report);
    }
    summary
}

fn log_report(report: &DownloadReport) {
    let asset = report.asset_code.as_str();
    let rendition = report.rendition.as_str();
    match &report.outcome {
        DownloadOutcome::Downloaded { output_path, bytes } => info!(
            asset,
            rendition,
            file = %output_path.display(),
            bytes,
            "Successfully downloaded"
        ),
        DownloadOutcome::Absent => warn!(asset, rendition, "No URL found for this size"),
        DownloadOutcome::Unsupported => warn!(asset, rendition, "Unsupported size"),
        DownloadOutcome::Duplicate { output_path } => warn!(
            asset,
            rendition,
            file = %output_path.display(),
            "Skipping, output file is already written by another photo"
        ),
        DownloadOutcome::Failed { output_path, error } => warn!(
            asset,
            rendition,
            file = %output_path.display(),
            "Error downloading: {}",
            error
        ),
    }
}
