use std::time::Duration;

use anyhow::Result;
use serde_json::{Map, Value};

use crate::{
    common::{fetch_bytes, fetch_json},
    error::AdmError,
    geom::{read_from_geojson_bytes, BoundaryCollection},
};

use super::{BoundarySource, ADMIN_DEPTH, COUNTRY};

const NAME: &str = "geoboundaries";

const METADATA_TIMEOUT: Duration = Duration::from_secs(60);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Metadata keys that may hold the GeoJSON download URL, highest priority first.
pub const DOWNLOAD_KEY_CANDIDATES: [&str; 4] = [
    "gjDownloadURL",
    "downloadURL",
    "gjDownloadURLSimplified",
    "simplifiedGeometryGeoJSON",
];

/// geoBoundaries gbOpen: a metadata API call names the GeoJSON to download.
#[derive(Debug, Clone)]
pub struct GeoBoundaries {
    metadata_url: String,
}

impl Default for GeoBoundaries {
    fn default() -> Self {
        Self {
            metadata_url: format!("https://www.geoboundaries.org/api/current/gbOpen/{COUNTRY}/ADM{ADMIN_DEPTH}/"),
        }
    }
}

impl GeoBoundaries {
    /// Use a different metadata endpoint (mirrors, other releases).
    pub fn with_metadata_url(metadata_url: impl Into<String>) -> Self {
        Self { metadata_url: metadata_url.into() }
    }
}

impl BoundarySource for GeoBoundaries {
    fn name(&self) -> &'static str { NAME }

    fn fetch(&self) -> Result<BoundaryCollection> {
        tracing::info!(url = %self.metadata_url, "querying geoBoundaries metadata");
        let meta = fetch_json(&self.metadata_url, METADATA_TIMEOUT)
            .map_err(|e| AdmError::unavailable_from(NAME, e))?;

        let url = find_download_url(&meta).ok_or_else(|| AdmError::unavailable(
            NAME, "Could not locate GeoJSON download URL in the metadata response",
        ))?;

        tracing::info!(url = %url, "downloading boundaries");
        let bytes = fetch_bytes(&url, DOWNLOAD_TIMEOUT)
            .map_err(|e| AdmError::unavailable_from(NAME, e))?;
        tracing::debug!(bytes = bytes.len(), "downloaded GeoJSON");

        read_from_geojson_bytes(&bytes).map_err(|e| AdmError::unavailable_from(NAME, e).into())
    }
}

/// True for URLs ending in `.geojson`, ignoring case.
fn is_geojson_url(value: &str) -> bool {
    value.to_ascii_lowercase().ends_with(".geojson")
}

/// Locate the GeoJSON URL in a metadata response (an object or a list of objects).
///
/// Known keys are tried in priority order across every object first; only
/// then is every string field scanned, in document order.
pub fn find_download_url(meta: &Value) -> Option<String> {
    let objects: Vec<&Map<String, Value>> = match meta {
        Value::Object(object) => vec![object],
        Value::Array(items) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    };

    /// First candidate key, in priority order, holding a GeoJSON URL.
    fn known_key(object: &Map<String, Value>) -> Option<&str> {
        DOWNLOAD_KEY_CANDIDATES.iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .find(|value| is_geojson_url(value))
    }

    /// First string field of any name holding a GeoJSON URL.
    fn scan(object: &Map<String, Value>) -> Option<&str> {
        object.values()
            .filter_map(Value::as_str)
            .find(|value| is_geojson_url(value))
    }

    objects.iter().copied().find_map(known_key)
        .or_else(|| objects.iter().copied().find_map(scan))
        .map(str::to_string)
}
