use super::types::{AssetDescriptor, Catalog, CatalogEnvelope, RawPhoto};
use crate::config::CatalogConfig;
use crate::error::ThumbFetchError;
use std::path::Path;
use std::time::Duration;

/// Issues the single listing request and decodes the response.
pub struct CatalogClient {
    client: reqwest::Client,
    config: CatalogConfig,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig) -> Result<Self, ThumbFetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn fetch_catalog(&self) -> Result<Catalog, ThumbFetchError> {
        let endpoint = &self.config.endpoint;
        let token_id = self.config.token_id.as_deref().unwrap_or_default();
        tracing::info!(endpoint = %endpoint, "Requesting catalog");

        let request_error = |source| ThumbFetchError::CatalogRequest {
            endpoint: endpoint.clone(),
            source,
        };

        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("tokenId", token_id.to_string()),
                ("currentPageIndex", self.config.page_index.to_string()),
                ("limit", self.config.limit.to_string()),
                ("sortField", self.config.sort_field.clone()),
                ("order", self.config.order.to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ThumbFetchError::CatalogStatus {
                endpoint: endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        parse_catalog(&body)
    }
}

/// Reads a previously saved listing response from disk.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, ThumbFetchError> {
    let body = std::fs::read(path).map_err(|e| ThumbFetchError::CatalogFile {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_catalog(&body)
}

pub fn parse_catalog(body: &[u8]) -> Result<Catalog, ThumbFetchError> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(ThumbFetchError::CatalogDecode)?;
    if !value.is_object() {
        return Err(ThumbFetchError::CatalogDecode(serde::de::Error::custom(
            "expected the catalog response to be an object",
        )));
    }
    let envelope: CatalogEnvelope =
        serde_json::from_value(value).map_err(ThumbFetchError::CatalogDecode)?;

    if envelope.status != 0 {
        tracing::warn!(
            status = envelope.status,
            message = %envelope.message,
            "Catalog reported a non-zero status"
        );
    }

    let mut assets = Vec::with_capacity(envelope.result.photos.len());
    for (index, photo) in envelope.result.photos.into_iter().enumerate() {
        let raw: RawPhoto = match serde_json::from_value(photo) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(index, "Skipping catalog entry that is not a photo: {}", e);
                continue;
            }
        };
        if raw.photo_code.is_empty() {
            tracing::warn!(index, "Skipping photo, no photo code specified");
            continue;
        }
        assets.push(AssetDescriptor {
            code: raw.photo_code,
            renditions: raw.thumbnail,
        });
    }

    Ok(Catalog {
        status: envelope.status,
        message: envelope.message,
        time: envelope.result.time,
        assets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_catalog_extracts_codes_and_renditions() {
        let body = json!({
            "status": 0,
            "msg": "success",
            "result": {
                "photos": [{
                    "_id": "5f1",
                    "photoCode": "P1",
                    "isFavorite": false,
                    "thumbnail": {
                        "x1024": {"path": "p/1", "url": "/img/p1.jpg", "width": 1024, "height": 768},
                        "x128": {"path": "", "url": "", "width": 0, "height": 0}
                    }
                }],
                "time": 1728000000
            },
            "localIp": 0
        });

        let catalog = parse_catalog(body.to_string().as_bytes()).unwrap();

        assert_eq!(catalog.time, 1728000000);
        assert_eq!(catalog.assets.len(), 1);
        let asset = &catalog.assets[0];
        assert_eq!(asset.code, "P1");
        let large = asset.rendition("x1024").unwrap();
        assert_eq!(large.url, "/img/p1.jpg");
        assert_eq!((large.width, large.height), (1024, 768));
        assert!(asset.rendition("x128").unwrap().is_absent());
        assert!(asset.rendition("x512").is_none());
    }

    #[test]
    fn test_parse_catalog_tolerates_malformed_sibling_fields() {
        let body = json!({
            "status": "ok",
            "result": {
                "photos": [{
                    "photoCode": "P2",
                    "likeCount": "many",
                    "comments": {"unexpected": true},
                    "shootOn": 12,
                    "customerIds": "nope",
                    "thumbnail": {
                        "x1024": {"url": "/img/p2.jpg", "width": "wide"},
                        "w512": "garbage"
                    }
                }]
            }
        });

        let catalog = parse_catalog(body.to_string().as_bytes()).unwrap();

        assert_eq!(catalog.status, 0);
        assert_eq!(catalog.assets.len(), 1);
        let asset = &catalog.assets[0];
        assert_eq!(asset.rendition("x1024").unwrap().url, "/img/p2.jpg");
        assert_eq!(asset.rendition("x1024").unwrap().width, 0);
        assert!(asset.rendition("w512").is_none());
    }

    #[test]
    fn test_parse_catalog_skips_photos_without_code() {
        let body = json!({
            "result": {"photos": [{"thumbnail": {}}, 7, {"photoCode": "P3"}]}
        });

        let catalog = parse_catalog(body.to_string().as_bytes()).unwrap();

        let codes: Vec<_> = catalog.assets.iter().map(|a| a.code.as_str()).collect();
        assert_eq!(codes, vec!["P3"]);
    }

    #[test]
    fn test_parse_catalog_empty_envelope() {
        let catalog = parse_catalog(b"{}").unwrap();
        assert!(catalog.assets.is_empty());
    }

    #[test]
    fn test_parse_catalog_rejects_wrongly_shaped_envelope() {
        for body in [
            r#"{"result": "garbage"}"#,
            r#"{"result": []}"#,
            r#"{"result": {"photos": {"a": 1}}}"#,
            r#"{"result": {"photos": "none"}}"#,
            "[]",
            "42",
        ] {
            let result = parse_catalog(body.as_bytes());
            assert!(
                matches!(result, Err(ThumbFetchError::CatalogDecode(_))),
                "{body} should be rejected, got {result:?}"
            );
        }
    }

    #[test]
    fn test_parse_catalog_rejects_malformed_json() {
        let result = parse_catalog(b"{\"result\": [");
        assert!(matches!(result, Err(ThumbFetchError::CatalogDecode(_))));
    }
}
