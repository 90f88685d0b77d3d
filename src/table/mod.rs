//! The centroid table: one row per third-level administrative unit.

mod read;
mod write;

use anyhow::Result;

use crate::{error::AdmError, schema::{RegionLevel, RegionNames, NULL_MARKER}};

pub use read::{read_table, read_table_bytes};
pub use write::{sort_records, write_table, write_table_bytes};

pub const LATITUDE_COL: &str = "Latitude";
pub const LONGITUDE_COL: &str = "Longitude";

/// Column headers, in file order.
pub fn header() -> [&'static str; 5] {
    [
        RegionLevel::State.header(),
        RegionLevel::District.header(),
        RegionLevel::Subdistrict.header(),
        LATITUDE_COL,
        LONGITUDE_COL,
    ]
}

/// One row of the centroid table.
#[derive(Debug, Clone, PartialEq)]
pub struct CentroidRecord {
    pub state: String,
    pub district: String,
    pub subdistrict: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CentroidRecord {
    pub fn new(names: RegionNames, latitude: f64, longitude: f64) -> Self {
        let RegionNames { state, district, subdistrict } = names;
        Self { state, district, subdistrict, latitude, longitude }
    }

    /// True when any region name is the null marker.
    pub fn has_null_marker(&self) -> bool {
        [&self.state, &self.district, &self.subdistrict].iter().any(|name| name.as_str() == NULL_MARKER)
    }
}

/// What to do with rows whose region names carry the null marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullRowPolicy {
    /// Keep them in the output.
    Keep,
    /// Drop them silently (count is logged).
    Drop,
    /// Abort the run.
    Fail,
}

impl NullRowPolicy {
    /// Apply the policy, returning the rows that survive.
    pub fn apply(self, records: Vec<CentroidRecord>) -> Result<Vec<CentroidRecord>> {
        let nulls = records.iter().filter(|r| r.has_null_marker()).count();
        if nulls == 0 {
            return Ok(records);
        }

        match self {
            NullRowPolicy::Keep => {
                tracing::warn!(rows = nulls, marker = NULL_MARKER, "keeping rows with missing region names");
                Ok(records)
            }
            NullRowPolicy::Drop => {
                tracing::info!(rows = nulls, marker = NULL_MARKER, "dropping rows with missing region names");
                Ok(records.into_iter().filter(|r| !r.has_null_marker()).collect())
            }
            NullRowPolicy::Fail => Err(AdmError::configuration(format!(
                "{nulls} of {} rows have missing region names", records.len()
            )).into()),
        }
    }
}
