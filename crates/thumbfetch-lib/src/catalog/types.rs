use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Decodes a field, falling back to its default if the value has the wrong shape.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn lenient_renditions<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<String, RenditionReference>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Object(entries) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(entries
        .into_iter()
        .filter_map(|(id, entry)| {
            serde_json::from_value::<RenditionReference>(entry)
                .ok()
                .map(|reference| (id, reference))
        })
        .collect())
}

/// Decodes a value that must be a JSON object; a missing field still defaults.
fn object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Err(D::Error::custom(format!("expected an object, found {value}")));
    }
    serde_json::from_value(value).map_err(D::Error::custom)
}

/// Top-level envelope returned by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogEnvelope {
    #[serde(deserialize_with = "lenient")]
    pub status: i64,
    #[serde(rename = "msg", deserialize_with = "lenient")]
    pub message: String,
    #[serde(deserialize_with = "object")]
    pub result: CatalogResult,
    #[serde(rename = "localIp", deserialize_with = "lenient")]
    pub local_ip: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CatalogResult {
    /// Kept undecoded so one odd photo cannot fail the whole listing
    pub photos: Vec<serde_json::Value>,
    #[serde(deserialize_with = "lenient")]
    pub time: i64,
}

/// The subset of a catalog photo that the fetch engine reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawPhoto {
    #[serde(rename = "photoCode", deserialize_with = "lenient")]
    pub photo_code: String,
    #[serde(deserialize_with = "lenient_renditions")]
    pub thumbnail: BTreeMap<String, RenditionReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenditionReference {
    /// Relative or absolute URL; empty means the rendition does not exist
    #[serde(deserialize_with = "lenient")]
    pub url: String,
    #[serde(deserialize_with = "lenient")]
    pub path: String,
    #[serde(deserialize_with = "lenient")]
    pub width: u32,
    #[serde(deserialize_with = "lenient")]
    pub height: u32,
}

impl RenditionReference {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            path: String::new(),
            width,
            height,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.url.is_empty()
    }
}

/// One catalog item, reduced to what is needed to download its renditions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub code: String,
    pub renditions: BTreeMap<String, RenditionReference>,
}

impl AssetDescriptor {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            renditions: BTreeMap::new(),
        }
    }

    pub fn with_rendition(mut self, id: impl Into<String>, reference: RenditionReference) -> Self {
        self.renditions.insert(id.into(), reference);
        self
    }

    pub fn rendition(&self, id: &str) -> Option<&RenditionReference> {
        self.renditions.get(id)
    }
}

/// Decoded listing: envelope metadata plus the usable assets.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub status: i64,
    pub message: String,
    pub time: i64,
    pub assets: Vec<AssetDescriptor>,
}
