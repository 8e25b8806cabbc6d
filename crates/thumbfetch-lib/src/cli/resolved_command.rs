use crate::cli::args::Command;
use crate::cli::params::{CatalogSource, FetchParams, ListParams};
use crate::config::{CatalogConfig, Config, load_config};
use crate::download::{FetchOptions, Rendition};
use crate::error::ThumbFetchError;
use std::path::PathBuf;
use url::Url;

#[derive(Debug, Clone)]
pub enum ResolvedCommand {
    Fetch(FetchParams),
    List(ListParams),
}

fn load_optional_config(config_path: Option<&str>) -> Result<Config, ThumbFetchError> {
    match config_path {
        Some(config_path) => {
            tracing::info!("Loading configuration from {}", config_path);
            load_config(config_path)
        }
        None => Ok(Config::default()),
    }
}

fn resolve_catalog_source(
    mut catalog: CatalogConfig,
    token_id: Option<String>,
    endpoint: Option<String>,
    catalog_file: Option<String>,
) -> Result<CatalogSource, ThumbFetchError> {
    if let Some(catalog_file) = catalog_file {
        return Ok(CatalogSource::File(PathBuf::from(catalog_file)));
    }

    if let Some(token_id) = token_id {
        catalog.token_id = Some(token_id);
    }
    if let Some(endpoint) = endpoint {
        catalog.endpoint = endpoint;
    }

    if catalog.token_id.as_deref().is_none_or(str::is_empty) {
        return Err(ThumbFetchError::CliArgumentValidation {
            details: "No catalog token provided. Configure catalog.token_id, pass --token-id or use --catalog-file.".to_string(),
        });
    }
    if catalog.timeout_secs == 0 {
        return Err(ThumbFetchError::CliArgumentValidation {
            details: "catalog.timeout_secs must be greater than 0.".to_string(),
        });
    }

    Ok(CatalogSource::Remote(catalog))
}

pub fn resolve_command(command: Command) -> Result<ResolvedCommand, ThumbFetchError> {
    match command {
        Command::Fetch {
            config_path,
            token_id,
            endpoint,
            catalog_file,
            base_origin,
            output_dir,
            renditions,
            max_parallelism,
            timeout_secs,
            fail_on_error,
        } => {
            let app_config = load_optional_config(config_path.as_deref())?;
            let download = app_config.download;

            let catalog_source =
                resolve_catalog_source(app_config.catalog, token_id, endpoint, catalog_file)?;

            let options = FetchOptions {
                timeout_secs: timeout_secs.unwrap_or(download.timeout_secs),
                max_parallelism: max_parallelism.unwrap_or(download.max_parallelism),
            };
            for (name, value) in [
                ("timeout-secs", options.timeout_secs as usize),
                ("max-parallelism", options.max_parallelism),
            ] {
                if value == 0 {
                    return Err(ThumbFetchError::CliArgumentValidation {
                        details: format!("{name} must be greater than 0."),
                    });
                }
            }

            let renditions = if renditions.is_empty() {
                download.renditions
            } else {
                renditions
            };
            if renditions.is_empty() {
                return Err(ThumbFetchError::CliArgumentValidation {
                    details: "No renditions requested. Configure download.renditions or pass --rendition.".to_string(),
                });
            }
            for rendition in &renditions {
                if rendition.parse::<Rendition>().is_err() {
                    tracing::warn!(
                        rendition = %rendition,
                        "Requested rendition is not supported and will be skipped"
                    );
                }
            }

            let base_origin = base_origin.unwrap_or(download.base_origin);
            Url::parse(&base_origin).map_err(|e| ThumbFetchError::InvalidBaseOrigin {
                origin: base_origin.clone(),
                reason: e.to_string(),
            })?;

            Ok(ResolvedCommand::Fetch(FetchParams {
                catalog_source,
                base_origin,
                output_dir: output_dir.map(PathBuf::from).unwrap_or(download.output_dir),
                renditions,
                options,
                fail_on_error: fail_on_error || download.fail_on_error,
            }))
        }
        Command::List {
            config_path,
            token_id,
            endpoint,
            catalog_file,
        } => {
            let app_config = load_optional_config(config_path.as_deref())?;
            let catalog_source =
                resolve_catalog_source(app_config.catalog, token_id, endpoint, catalog_file)?;

            Ok(ResolvedCommand::List(ListParams { catalog_source }))
        }
    }
}
