use std::{fs::File, io::Cursor, path::Path, sync::Arc};

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::schema::{RegionLevel, NULL_MARKER};

use super::{CentroidRecord, LATITUDE_COL, LONGITUDE_COL};

/// Schema overwrite: names always read as strings (a numeric-looking tehsil
/// name must not become a float), coordinates as f64.
fn table_schema() -> SchemaRef {
    Arc::new(Schema::from_iter([
        Field::new(RegionLevel::State.header().into(), DataType::String),
        Field::new(RegionLevel::District.header().into(), DataType::String),
        Field::new(RegionLevel::Subdistrict.header().into(), DataType::String),
        Field::new(LATITUDE_COL.into(), DataType::Float64),
        Field::new(LONGITUDE_COL.into(), DataType::Float64),
    ]))
}

fn read_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_schema_overwrite(Some(table_schema()))
}

/// Reads the centroid table from a CSV file at `path`.
pub fn read_table(path: &Path) -> Result<Vec<CentroidRecord>> {
    let file = File::open(path)
        .with_context(|| format!("[table::read] Failed to read CSV file: {}", path.display()))?;
    let df = CsvReader::new(file)
        .with_options(read_options())
        .finish()
        .with_context(|| format!("[table::read] Failed to parse CSV file: {}", path.display()))?;
    dataframe_to_records(&df)
}

/// Reads the centroid table from CSV bytes.
pub fn read_table_bytes(bytes: &[u8]) -> Result<Vec<CentroidRecord>> {
    let df = CsvReader::new(Cursor::new(bytes))
        .with_options(read_options())
        .finish()
        .context("[table::read] Failed to parse CSV bytes")?;
    dataframe_to_records(&df)
}

/// Coerce each row: names to trimmed strings (null → marker), coordinates to f64 (null → NaN).
fn dataframe_to_records(df: &DataFrame) -> Result<Vec<CentroidRecord>> {
    let names = |name: &str| -> Result<Vec<String>> {
        let column = df.column(name)
            .with_context(|| format!("[table::read] missing column {name:?}"))?;
        let series = column.as_materialized_series().cast(&DataType::String)?;
        Ok(series.str()?
            .into_iter()
            .map(|value| value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(NULL_MARKER).to_string())
            .collect())
    };

    let coords = |name: &str| -> Result<Vec<f64>> {
        let column = df.column(name)
            .with_context(|| format!("[table::read] missing column {name:?}"))?;
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        Ok(series.f64()?
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect())
    };

    let states = names(RegionLevel::State.header())?;
    let districts = names(RegionLevel::District.header())?;
    let subdistricts = names(RegionLevel::Subdistrict.header())?;
    let latitudes = coords(LATITUDE_COL)?;
    let longitudes = coords(LONGITUDE_COL)?;

    Ok(states.into_iter()
        .zip(districts)
        .zip(subdistricts)
        .zip(latitudes.into_iter().zip(longitudes))
        .map(|(((state, district), subdistrict), (latitude, longitude))| CentroidRecord {
            state,
            district,
            subdistrict,
            latitude,
            longitude,
        })
        .collect())
}
