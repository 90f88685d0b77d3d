use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{self as shp, dbase::{FieldValue, Record}, PolygonRing, Reader, Shape};

use super::{BoundaryCollection, BoundaryFeature, NAD83, WEB_MERCATOR, WGS84};

/// Reads all polygons + attribute records from a given `.shp` file path.
/// The CRS is sniffed from the sibling `.prj`, when there is one.
pub fn read_from_shapefile(path: &Path) -> Result<BoundaryCollection> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut collection = BoundaryCollection::new(epsg_from_prj(&path.with_extension("prj")));

    for result in reader.iter_shapes_and_records() {
        let (shape, record) = result.context("Error reading shape+record")?;
        collection.push(BoundaryFeature::new(
            shape_to_multipolygon(shape)?,
            record_to_properties(record),
        ));
    }

    Ok(collection)
}

/// Coerce a generic shape into an owned multipolygon, raising error if different shape.
fn shape_to_multipolygon(shape: Shape) -> Result<MultiPolygon<f64>> {
    match shape {
        Shape::Polygon(polygon) => Ok(shp_to_geo(&polygon)),
        Shape::NullShape => Ok(MultiPolygon(vec![])),
        other => bail!("found non-Polygon shape in layer: {:?}", other.shapetype()),
    }
}

/// Attribute values as strings, sorted by column name (dBase records are unordered).
fn record_to_properties(record: Record) -> Vec<(String, String)> {
    let mut properties: Vec<(String, String)> = record.into_iter()
        .filter_map(|(name, value)| {
            let value = match value {
                FieldValue::Character(Some(s)) => s.trim().to_string(),
                FieldValue::Memo(s) => s.trim().to_string(),
                FieldValue::Numeric(Some(n)) => n.to_string(),
                FieldValue::Float(Some(f)) => f.to_string(),
                FieldValue::Double(d) => d.to_string(),
                FieldValue::Integer(i) => i.to_string(),
                FieldValue::Logical(Some(b)) => b.to_string(),
                _ => return None,
            };
            Some((name, value))
        })
        .collect();
    properties.sort_by(|a, b| a.0.cmp(&b.0));
    properties
}

/// EPSG code guessed from ESRI/OGC WKT in a `.prj` file.
pub(crate) fn epsg_from_prj(path: &Path) -> Option<u32> {
    let wkt = fs::read_to_string(path).ok()?;
    epsg_from_wkt(&wkt)
}

fn epsg_from_wkt(wkt: &str) -> Option<u32> {
    let wkt = wkt.to_ascii_uppercase();
    // Projected Web Mercator WKT also names the WGS84 datum, so test it first.
    if wkt.contains("MERCATOR_AUXILIARY_SPHERE") || wkt.contains("PSEUDO-MERCATOR") || wkt.contains("PSEUDO_MERCATOR") {
        Some(WEB_MERCATOR)
    } else if wkt.contains("NAD83") || wkt.contains("NORTH_AMERICAN_1983") {
        Some(NAD83)
    } else if wkt.contains("WGS_1984") || wkt.contains("WGS 84") || wkt.contains("WGS84") {
        Some(WGS84)
    } else {
        None
    }
}

/// Convert shapefile::Polygon to geo::MultiPolygon<f64>.
/// Shapefile stores each outer ring followed by its holes.
pub(crate) fn shp_to_geo(p: &shp::Polygon) -> MultiPolygon<f64> {
    /// Ensure first and last are the same for geo::LineString coords
    fn to_closed_ring(points: &[shp::Point]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
        LineString(coords)
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut current_exterior: Option<LineString<f64>> = None;
    let mut current_holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                // flush previous polygon
                if let Some(ext) = current_exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut current_holes)));
                }
                current_exterior = Some(to_closed_ring(points));
            }
            PolygonRing::Inner(points) => current_holes.push(to_closed_ring(points)),
        }
    }
    if let Some(ext) = current_exterior {
        polys.push(Polygon::new(ext, current_holes));
    }

    MultiPolygon(polys)
}
