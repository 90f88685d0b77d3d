//! Boundary providers for India's sub-district (admin depth 3) units.

mod gadm;
mod geoboundaries;
mod layer;

use std::{fmt, path::Path, str::FromStr};

use anyhow::Result;

use crate::{error::AdmError, geom::BoundaryCollection};

pub use gadm::{list_shapefile_layers, read_layer_from_archive, Gadm};
pub use geoboundaries::{find_download_url, GeoBoundaries, DOWNLOAD_KEY_CANDIDATES};
pub use layer::{select_layer, LayerPolicy, LayerStrategy};

/// ISO 3166-1 alpha-3 code of the country fetched.
pub const COUNTRY: &str = "IND";

/// Administrative depth of the leaf units (state = 1, district = 2, sub-district = 3).
pub const ADMIN_DEPTH: u8 = 3;

/// Anything that can produce a boundary collection.
pub trait BoundarySource {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Download and parse the boundaries.
    fn fetch(&self) -> Result<BoundaryCollection>;
}

/// Which provider to fetch boundaries from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Provider {
    #[default]
    GeoBoundaries,
    Gadm,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GeoBoundaries => "geoboundaries",
            Provider::Gadm => "gadm",
        }
    }

    /// Build the source for this provider. `work_dir` holds the GADM archive.
    pub fn source(self, work_dir: &Path, layer_policy: LayerPolicy) -> Box<dyn BoundarySource> {
        match self {
            Provider::GeoBoundaries => Box::new(GeoBoundaries::default()),
            Provider::Gadm => Box::new(Gadm::new(work_dir, layer_policy)),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AdmError;

    /// Case-insensitive; anything else is a configuration error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geoboundaries" => Ok(Provider::GeoBoundaries),
            "gadm" => Ok(Provider::Gadm),
            _ => Err(AdmError::configuration(format!(
                "Unknown method {s:?}. Use 'geoboundaries' or 'gadm'."
            ))),
        }
    }
}

/// Resolve a method name to a ready-to-fetch source.
pub fn select_source(method: &str, work_dir: &Path, layer_policy: LayerPolicy) -> Result<Box<dyn BoundarySource>> {
    let provider: Provider = method.parse()?;
    Ok(provider.source(work_dir, layer_policy))
}
