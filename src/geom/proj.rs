use anyhow::{anyhow, Context, Result};
use geo::{Centroid, Coord, MapCoords, MultiPolygon, Point};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use super::{BoundaryCollection, NAD83, WEB_MERCATOR, WGS84};

const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";
const NAD83_PROJ4: &str = "+proj=longlat +datum=NAD83 +no_defs +type=crs";
const WEB_MERCATOR_PROJ4: &str =
    "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs +type=crs";

fn build_proj(proj_string: &str) -> Result<Proj4> {
    Proj4::from_proj_string(proj_string)
        .with_context(|| anyhow!("failed to build PROJ.4: {proj_string}"))
}

/// Computes polygon centroids in Web Mercator and reports them as WGS84 lon/lat.
///
/// Lon/lat centroids are visibly skewed at country scale; a planar projection
/// gives a stable areal centroid. Mercator's area distortion grows toward the
/// poles, which is immaterial at Indian latitudes.
pub struct CentroidProjector {
    /// Geographic source CRS, or `None` when the input is already Web Mercator.
    source: Option<Proj4>,
    mercator: Proj4,
    wgs84: Proj4,
}

impl CentroidProjector {
    /// Build a projector for shapes in the given EPSG code (4326, 4269 or 3857).
    pub fn new(epsg: u32) -> Result<Self> {
        let source = match epsg {
            WGS84 => Some(build_proj(WGS84_PROJ4)?),
            NAD83 => Some(build_proj(NAD83_PROJ4)?),
            WEB_MERCATOR => None,
            other => return Err(anyhow!("unsupported source CRS EPSG:{other}")),
        };

        Ok(Self {
            source,
            mercator: build_proj(WEB_MERCATOR_PROJ4)?,
            wgs84: build_proj(WGS84_PROJ4)?,
        })
    }

    /// Build a projector for a collection's attached CRS (WGS84 when none).
    pub fn for_collection(collection: &BoundaryCollection) -> Result<Self> {
        Self::new(collection.epsg())
    }

    /// Reproject a shape from the source CRS into Web Mercator metres.
    pub fn to_mercator(&self, shape: &MultiPolygon<f64>) -> Result<MultiPolygon<f64>> {
        let Some(source) = &self.source else { return Ok(shape.clone()) };
        let mercator = &self.mercator;

        // Map coords → radians in, meters out.
        shape.try_map_coords(|coord: Coord<f64>| {
            let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
            transform(source, mercator, &mut point)
                .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e:?}", coord.x, coord.y))?;
            Ok(Coord { x: point.0, y: point.1 })
        })
    }

    /// Convert a Web Mercator point back to WGS84 (lon, lat) degrees.
    pub fn to_wgs84(&self, point: Point<f64>) -> Result<Point<f64>> {
        let mut xyz = (point.x(), point.y(), 0.0);
        transform(&self.mercator, &self.wgs84, &mut xyz)
            .map_err(|e| anyhow!("CRS transform failed at ({}, {}): {e:?}", point.x(), point.y()))?;
        Ok(Point::new(xyz.0.to_degrees(), xyz.1.to_degrees()))
    }

    /// Planar centroid of `shape`, as WGS84 (lon, lat) degrees.
    /// Empty shapes have no centroid and yield (NaN, NaN).
    pub fn centroid(&self, shape: &MultiPolygon<f64>) -> Result<Point<f64>> {
        match self.to_mercator(shape)?.centroid() {
            Some(center) => self.to_wgs84(center),
            None => Ok(Point::new(f64::NAN, f64::NAN)),
        }
    }
}
