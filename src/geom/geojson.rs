use anyhow::{anyhow, Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use regex::Regex;
use serde_json::Value;

use super::{BoundaryCollection, BoundaryFeature, WGS84};

/// Read a GeoJSON FeatureCollection of (Multi)Polygons with their properties.
/// Features with other or missing geometry are kept with an empty shape.
pub fn read_from_geojson_bytes(bytes: &[u8]) -> Result<BoundaryCollection> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;

    let features = value.get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("GeoJSON document has no \"features\" array"))?;

    let mut collection = BoundaryCollection::new(crs_epsg(&value));

    for (idx, feature) in features.iter().enumerate() {
        let geometry = match feature.get("geometry") {
            Some(geometry) if geometry.is_object() => parse_geometry(geometry)
                .with_context(|| format!("Invalid geometry in feature {idx}"))?,
            _ => MultiPolygon(vec![]),
        };

        let mut properties = Vec::new();
        let mut null_columns = Vec::new();
        if let Some(props) = feature.get("properties").and_then(Value::as_object) {
            for (name, value) in props {
                match property_to_string(value) {
                    Some(s) => properties.push((name.clone(), s)),
                    None => null_columns.push(name.as_str()),
                }
            }
        }

        collection.push(BoundaryFeature::new(geometry, properties));
        for name in null_columns {
            collection.add_column(name);
        }
    }

    Ok(collection)
}

/// Coerce a property value to a string; null means absent.
fn property_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// EPSG code named by a legacy `crs` member, e.g. "urn:ogc:def:crs:EPSG::4326" or CRS84.
fn crs_epsg(value: &Value) -> Option<u32> {
    let name = value.get("crs")?.get("properties")?.get("name")?.as_str()?;
    if name.to_ascii_uppercase().ends_with("CRS84") {
        return Some(WGS84);
    }
    let re = Regex::new(r"(?i)EPSG:{1,2}(\d+)").ok()?;
    re.captures(name)?.get(1)?.as_str().parse().ok()
}

/// Parse a GeoJSON geometry object into a MultiPolygon.
fn parse_geometry(geometry: &Value) -> Result<MultiPolygon<f64>> {
    let coords = geometry.get("coordinates").and_then(Value::as_array);

    match (geometry.get("type").and_then(Value::as_str), coords) {
        (Some("Polygon"), Some(rings)) => Ok(MultiPolygon(vec![parse_polygon_coords(rings)?])),
        (Some("MultiPolygon"), Some(polygons)) => Ok(MultiPolygon(
            polygons.iter()
                .map(|polygon| {
                    let rings = polygon.as_array()
                        .ok_or_else(|| anyhow!("Invalid MultiPolygon: polygon is not an array"))?;
                    parse_polygon_coords(rings)
                })
                .collect::<Result<Vec<_>>>()?,
        )),
        (other, _) => {
            tracing::debug!(geometry_type = ?other, "skipping non-polygonal geometry");
            Ok(MultiPolygon(vec![]))
        }
    }
}

/// Parse polygon coordinates: [exterior, hole, hole, ...].
fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        ring.as_array()
            .ok_or_else(|| anyhow!("Invalid Polygon: ring is not an array"))
            .and_then(|coords| parse_ring_coords(coords))
    });

    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;

    Ok(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates: [[x, y], [x, y], ...]
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());

    for coord_pair in coords {
        let pair = coord_pair.as_array()
            .filter(|pair| pair.len() >= 2)
            .ok_or_else(|| anyhow!("Invalid coordinate: expected [x, y]"))?;
        let x = pair[0].as_f64()
            .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
        let y = pair[1].as_f64()
            .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
        points.push(Coord { x, y });
    }

    // Ensure ring is closed (first point == last point)
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }

    Ok(LineString(points))
}
