//! End-to-end runs of the two pipelines.

use std::path::PathBuf;

use anyhow::Result;

use crate::{
    emit::{LiteralEmitter, TranslatedRecord},
    geom::{BoundaryCollection, CentroidProjector},
    schema::{ColumnNormalizer, SchemaPolicy},
    source::{LayerPolicy, Provider},
    table::{read_table, write_table, CentroidRecord, NullRowPolicy},
    translate::Translator,
};

/// Settings for boundary → centroid table extraction.
#[derive(Debug, Clone)]
pub struct CentroidOptions {
    pub provider: Provider,
    pub out: PathBuf,
    /// Where downloaded archives are kept.
    pub work_dir: PathBuf,
    pub null_rows: NullRowPolicy,
    pub schema: SchemaPolicy,
    pub layer_policy: LayerPolicy,
}

impl Default for CentroidOptions {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            out: PathBuf::from("india_taluka_centroids.csv"),
            work_dir: PathBuf::from("."),
            null_rows: NullRowPolicy::Keep,
            schema: SchemaPolicy::default(),
            layer_policy: LayerPolicy::default(),
        }
    }
}

/// Settings for centroid table → TypeScript literal conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Name table to use instead of the built-in Hindi one.
    pub names: Option<PathBuf>,
    pub export_name: String,
    pub null_rows: NullRowPolicy,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("india_taluka_centroids_gadm.csv"),
            output: PathBuf::from("cities_comprehensive.ts"),
            names: None,
            export_name: "cities".into(),
            null_rows: NullRowPolicy::Drop,
        }
    }
}

/// Normalize names and compute one centroid per feature, in feature order.
pub fn centroid_records(collection: BoundaryCollection, schema: SchemaPolicy) -> Result<Vec<CentroidRecord>> {
    let projector = CentroidProjector::for_collection(&collection)?;
    let features = ColumnNormalizer::new(schema).normalize(collection)?;

    features.into_iter()
        .map(|feature| {
            let center = projector.centroid(&feature.geometry)?;
            Ok(CentroidRecord::new(feature.names, center.y(), center.x()))
        })
        .collect()
}

/// Fetch boundaries, compute centroids and write the sorted table. Returns the row count.
pub fn run_centroids(options: &CentroidOptions) -> Result<usize> {
    let source = options.provider.source(&options.work_dir, options.layer_policy);
    tracing::info!(provider = source.name(), "fetching boundaries");

    let collection = source.fetch()?;
    tracing::info!(features = collection.len(), epsg = collection.epsg(), "loaded boundaries");

    let records = centroid_records(collection, options.schema)?;
    let records = options.null_rows.apply(records)?;

    let rows = write_table(&options.out, &records)?;
    tracing::info!(rows, path = %options.out.display(), "wrote centroid table");
    Ok(rows)
}

/// Attach translations to every record, preserving order.
pub fn translate_records(records: Vec<CentroidRecord>, translator: &Translator) -> Vec<TranslatedRecord> {
    records.into_iter()
        .map(|record| TranslatedRecord::new(record, translator))
        .collect()
}

/// Read the table, translate state names and emit the literal. Returns the entry count.
pub fn run_convert(options: &ConvertOptions) -> Result<usize> {
    let emitter = LiteralEmitter::new(&options.export_name)?;
    let translator = match &options.names {
        Some(path) => Translator::from_file(path)?,
        None => Translator::builtin()?,
    };
    tracing::debug!(locale = translator.locale(), entries = translator.len(), "loaded name table");

    let records = read_table(&options.input)?;
    tracing::info!(rows = records.len(), path = %options.input.display(), "read centroid table");

    let records = options.null_rows.apply(records)?;
    let cities = translate_records(records, &translator);

    emitter.write(&options.output, &cities)?;
    tracing::info!(cities = cities.len(), path = %options.output.display(), "wrote source literal");
    Ok(cities.len())
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use crate::geom::BoundaryFeature;

    use super::*;

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y), (x: x + 0.1, y: y), (x: x + 0.1, y: y + 0.1), (x: x, y: y + 0.1), (x: x, y: y),
        ]])
    }

    fn feature(state: &str, district: &str, tehsil: &str, geometry: MultiPolygon<f64>) -> BoundaryFeature {
        BoundaryFeature::new(geometry, vec![
            ("NAME_1".into(), state.into()),
            ("NAME_2".into(), district.into()),
            ("NAME_3".into(), tehsil.into()),
        ])
    }

    #[test]
    fn one_record_per_feature_with_lat_lon_order() {
        let collection: BoundaryCollection = [
            feature("Goa", "North Goa", "Bicholim", square(73.9, 15.5)),
            feature(" Kerala ", "Idukki", "Thodupuzha", square(76.7, 9.8)),
        ].into_iter().collect();

        let records = centroid_records(collection, SchemaPolicy::Strict).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].subdistrict, "Bicholim");
        assert!((records[0].longitude - 73.95).abs() < 1e-6);
        assert!((records[0].latitude - 15.55).abs() < 1e-3);

        assert_eq!(records[1].state, "Kerala");
        assert!((records[1].latitude - 9.85).abs() < 1e-3);
    }

    #[test]
    fn empty_geometry_gives_nan_coordinates() {
        let collection: BoundaryCollection =
            [feature("Goa", "South Goa", "Ghost", MultiPolygon(vec![]))].into_iter().collect();
        let records = centroid_records(collection, SchemaPolicy::Degrade).unwrap();
        assert!(records[0].latitude.is_nan());
        assert!(records[0].longitude.is_nan());
    }

    #[test]
    fn unresolved_schema_in_strict_mode_fails() {
        let collection: BoundaryCollection =
            [BoundaryFeature::new(square(0.0, 0.0), vec![("shapeName".into(), "X".into())])].into_iter().collect();
        assert!(centroid_records(collection.clone(), SchemaPolicy::Strict).is_err());

        let records = centroid_records(collection, SchemaPolicy::Degrade).unwrap();
        assert!(records[0].has_null_marker());
    }

    #[test]
    fn defaults_match_historical_paths() {
        let centroids = CentroidOptions::default();
        assert_eq!(centroids.provider, Provider::GeoBoundaries);
        assert_eq!(centroids.null_rows, NullRowPolicy::Keep);

        let convert = ConvertOptions::default();
        assert_eq!(convert.null_rows, NullRowPolicy::Drop);
        assert_eq!(convert.export_name, "cities");
    }
}
