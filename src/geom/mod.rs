mod geojson;
mod proj;
mod shp;

use geo::MultiPolygon;

pub use geojson::read_from_geojson_bytes;
pub use proj::CentroidProjector;
pub use shp::read_from_shapefile;

/// EPSG code of WGS84 lon/lat, assumed when a source attaches no CRS.
pub const WGS84: u32 = 4326;

/// EPSG code of NAD83 lon/lat.
pub const NAD83: u32 = 4269;

/// EPSG code of spherical Web Mercator.
pub const WEB_MERCATOR: u32 = 3857;

/// One boundary polygon plus the provider's attributes, in source order.
#[derive(Debug, Clone)]
pub struct BoundaryFeature {
    pub geometry: MultiPolygon<f64>,
    pub properties: Vec<(String, String)>,
}

impl BoundaryFeature {
    pub fn new(geometry: MultiPolygon<f64>, properties: Vec<(String, String)>) -> Self {
        Self { geometry, properties }
    }

    /// Get an attribute value by exact column name.
    pub fn property(&self, column: &str) -> Option<&str> {
        self.properties.iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }
}

/// Boundary features fetched from a provider, plus the attribute columns seen
/// (first-seen order) and the attached CRS, if any.
#[derive(Debug, Clone, Default)]
pub struct BoundaryCollection {
    features: Vec<BoundaryFeature>,
    columns: Vec<String>,
    epsg: Option<u32>,
}

impl BoundaryCollection {
    pub fn new(epsg: Option<u32>) -> Self {
        Self { features: Vec::new(), columns: Vec::new(), epsg }
    }

    /// Append a feature, registering any attribute columns not seen before.
    pub fn push(&mut self, feature: BoundaryFeature) {
        for (name, _) in &feature.properties {
            if !self.columns.iter().any(|column| column == name) {
                self.columns.push(name.clone());
            }
        }
        self.features.push(feature);
    }

    /// Register a column that may carry no values (e.g. an all-null attribute).
    pub fn add_column(&mut self, name: &str) {
        if !self.columns.iter().any(|column| column == name) {
            self.columns.push(name.to_string());
        }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[BoundaryFeature] { &self.features }

    #[inline] pub fn columns(&self) -> &[String] { &self.columns }

    /// Get the EPSG code, or default to 4326 (WGS84 lon/lat) if unknown.
    #[inline] pub fn epsg(&self) -> u32 { self.epsg.unwrap_or(WGS84) }

    pub fn into_features(self) -> Vec<BoundaryFeature> { self.features }
}

impl FromIterator<BoundaryFeature> for BoundaryCollection {
    fn from_iter<I: IntoIterator<Item = BoundaryFeature>>(iter: I) -> Self {
        let mut collection = Self::new(None);
        for feature in iter {
            collection.push(feature);
        }
        collection
    }
}
