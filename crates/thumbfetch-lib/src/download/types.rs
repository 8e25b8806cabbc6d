use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A thumbnail size the engine knows how to name on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rendition {
    X1024,
    X512,
    W512,
    X128,
}

impl Rendition {
    pub const ALL: [Rendition; 4] = [
        Rendition::X1024,
        Rendition::X512,
        Rendition::W512,
        Rendition::X128,
    ];

    /// Identifier as it appears in the catalog's thumbnail map.
    pub fn id(self) -> &'static str {
        match self {
            Rendition::X1024 => "x1024",
            Rendition::X512 => "x512",
            Rendition::W512 => "w512",
            Rendition::X128 => "x128",
        }
    }

    /// Suffix used in output file names.
    pub fn size_label(self) -> &'static str {
        match self {
            Rendition::X1024 => "1024x",
            Rendition::X512 => "512x",
            Rendition::W512 => "512w",
            Rendition::X128 => "128x",
        }
    }
}

impl fmt::Display for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Rendition {
    type Err = UnsupportedRendition;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rendition::ALL
            .into_iter()
            .find(|rendition| rendition.id() == s)
            .ok_or_else(|| UnsupportedRendition {
                rendition: s.to_string(),
            })
    }
}

/// A requested rendition identifier outside the known set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported size: {rendition}")]
pub struct UnsupportedRendition {
    pub rendition: String,
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("received non-success status code: {status}")]
    BadStatus { status: u16 },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One (asset, rendition) transfer, resolved and ready to run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadTask {
    pub asset_code: String,
    pub rendition: Rendition,
    pub url: String,
    pub output_path: PathBuf,
}

#[derive(Debug)]
pub enum DownloadOutcome {
    Downloaded { output_path: PathBuf, bytes: u64 },
    /// The asset has no URL for this rendition
    Absent,
    Unsupported,
    /// Another asset in the same run already writes this file
    Duplicate { output_path: PathBuf },
    Failed {
        output_path: PathBuf,
        error: FetchError,
    },
}

/// Terminal state of one (asset, requested rendition) pair.
#[derive(Debug)]
pub struct DownloadReport {
    pub asset_code: String,
    /// Identifier exactly as requested by the caller
    pub rendition: String,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub assets: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes: u64,
    pub reports: Vec<DownloadReport>,
}

impl RunSummary {
    pub fn record(&mut self, report: DownloadReport) {
        match &report.outcome {
            DownloadOutcome::Downloaded { bytes, .. } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            DownloadOutcome::Absent
            | DownloadOutcome::Unsupported
            | DownloadOutcome::Duplicate { .. } => self.skipped += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
        self.reports.push(report);
    }

    pub fn reports_for<'a>(
        &'a self,
        asset_code: &'a str,
    ) -> impl Iterator<Item = &'a DownloadReport> + 'a {
        self.reports
            .iter()
            .filter(move |report| report.asset_code == asset_code)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FetchOptions {
    pub timeout_secs: u64,
    pub max_parallelism: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_parallelism: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rendition_parses_known_identifiers() {
        assert_eq!("x1024".parse::<Rendition>().unwrap(), Rendition::X1024);
        assert_eq!("w512".parse::<Rendition>().unwrap().size_label(), "512w");
        assert_eq!("x128".parse::<Rendition>().unwrap().size_label(), "128x");
    }

    #[test]
    fn test_rendition_rejects_unknown_identifier() {
        let err = "x9000".parse::<Rendition>().unwrap_err();
        assert_eq!(err.rendition, "x9000");
        assert_eq!(err.to_string(), "unsupported size: x9000");
    }

    #[test]
    fn test_run_summary_tallies_outcomes() {
        let mut summary = RunSummary::default();
        summary.record(DownloadReport {
            asset_code: "P1".to_string(),
            rendition: "x1024".to_string(),
            outcome: DownloadOutcome::Downloaded {
                output_path: PathBuf::from("P1_1024x.jpg"),
                bytes: 10,
            },
        });
        summary.record(DownloadReport {
            asset_code: "P1".to_string(),
            rendition: "x128".to_string(),
            outcome: DownloadOutcome::Absent,
        });
        summary.record(DownloadReport {
            asset_code: "P2".to_string(),
            rendition: "x1024".to_string(),
            outcome: DownloadOutcome::Failed {
                output_path: PathBuf::from("P2_1024x.jpg"),
                error: FetchError::BadStatus { status: 500 },
            },
        });

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.bytes, 10);
        assert_eq!(summary.reports_for("P1").count(), 2);
    }
}
