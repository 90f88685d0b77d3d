use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::{common::PendingWrite, schema::RegionLevel};

use super::{CentroidRecord, LATITUDE_COL, LONGITUDE_COL};

/// Build the five-column table from records (input order).
fn records_to_dataframe(records: &[CentroidRecord]) -> Result<DataFrame> {
    Ok(DataFrame::new(vec![
        Column::new(
            RegionLevel::State.header().into(),
            records.iter().map(|r| r.state.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            RegionLevel::District.header().into(),
            records.iter().map(|r| r.district.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            RegionLevel::Subdistrict.header().into(),
            records.iter().map(|r| r.subdistrict.clone()).collect::<Vec<String>>(),
        ),
        Column::new(
            LATITUDE_COL.into(),
            records.iter().map(|r| r.latitude).collect::<Vec<f64>>(),
        ),
        Column::new(
            LONGITUDE_COL.into(),
            records.iter().map(|r| r.longitude).collect::<Vec<f64>>(),
        ),
    ])?)
}

/// Sort ascending by (state, district, subdistrict), codepoint order, stable.
pub fn sort_records(records: &[CentroidRecord]) -> Result<DataFrame> {
    let df = records_to_dataframe(records)?;
    let by = RegionLevel::ALL.map(|level| level.header());
    Ok(df.sort(by, SortMultipleOptions::default().with_maintain_order(true))?)
}

/// Write the sorted table as CSV bytes (header, no index).
pub fn write_table_bytes(records: &[CentroidRecord]) -> Result<Vec<u8>> {
    let mut df = sort_records(records)?;
    let mut out = Vec::new();
    CsvWriter::new(&mut out)
        .include_header(true)
        .finish(&mut df)
        .context("[table::write] Failed to write CSV to bytes")?;
    Ok(out)
}

/// Write the sorted table to `path` atomically. Returns the number of rows.
pub fn write_table(path: &Path, records: &[CentroidRecord]) -> Result<usize> {
    let mut df = sort_records(records)?;
    let mut sink = PendingWrite::open(path)?;
    CsvWriter::new(&mut sink)
        .include_header(true)
        .finish(&mut df)
        .with_context(|| format!("[table::write] Failed to write CSV to {}", path.display()))?;
    sink.finalize()?;
    Ok(df.height())
}
