use anyhow::Result;
use geo::MultiPolygon;

use crate::{error::AdmError, geom::BoundaryCollection};

/// Sentinel written in place of a missing region name.
pub const NULL_MARKER: &str = "nan";

/// The three canonical region levels, top-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionLevel {
    State,
    District,
    Subdistrict,
}

impl RegionLevel {
    pub const ALL: [RegionLevel; 3] = [RegionLevel::State, RegionLevel::District, RegionLevel::Subdistrict];

    /// Canonical column header in the centroid table.
    pub fn header(&self) -> &'static str {
        match self {
            RegionLevel::State => "State",
            RegionLevel::District => "District",
            RegionLevel::Subdistrict => "Taluka/Tehsil",
        }
    }

    /// Known provider attribute names for this level, highest priority first.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            RegionLevel::State => &[
                "ADM1_EN", "ADM1_NAME", "NAME_1", "state", "STATE", "ST_NAME", "NAME1", "NAME_ENG_1",
            ],
            RegionLevel::District => &[
                "ADM2_EN", "ADM2_NAME", "NAME_2", "district", "DISTRICT", "DIST_NAME", "NAME2", "NAME_ENG_2",
            ],
            RegionLevel::Subdistrict => &[
                "ADM3_EN", "ADM3_NAME", "NAME_3", "SubDist_Name", "subdistrict", "TEHSIL", "TALUKA",
                "TALUK", "TALUK_NAME", "MANDAL", "BLOCK", "shapeName", "NAME3", "NAME_ENG_3",
            ],
        }
    }
}

/// Outcome of matching a canonical field against a provider's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolution {
    Resolved(String),
    Unresolved,
}

/// Find the source column for a canonical field.
///
/// Exact matches win, in candidate order. Otherwise, for each candidate in
/// order, the first column whose lowercase name equals, ends with or contains
/// the lowercase candidate.
pub fn resolve_field(columns: &[String], candidates: &[&str]) -> FieldResolution {
    if let Some(hit) = candidates.iter().find(|cand| columns.iter().any(|col| col == *cand)) {
        return FieldResolution::Resolved(hit.to_string());
    }

    for cand in candidates {
        let cand = cand.to_lowercase();
        let hit = columns.iter().find(|col| {
            let col = col.to_lowercase();
            col == cand || col.ends_with(&cand) || col.contains(&cand)
        });
        if let Some(col) = hit {
            return FieldResolution::Resolved(col.clone());
        }
    }

    FieldResolution::Unresolved
}

/// What to do when a canonical field has no matching column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaPolicy {
    /// Fill the field with [`NULL_MARKER`] and log a warning.
    #[default]
    Degrade,
    /// Fail with a configuration error.
    Strict,
}

/// Region names of one feature, whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RegionNames {
    pub state: String,
    pub district: String,
    pub subdistrict: String,
}

/// A boundary reduced to its canonical names plus geometry.
#[derive(Debug, Clone)]
pub struct NormalizedFeature {
    pub names: RegionNames,
    pub geometry: MultiPolygon<f64>,
}

/// Maps provider attribute names onto the canonical three-level naming scheme.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnNormalizer {
    policy: SchemaPolicy,
}

impl ColumnNormalizer {
    pub fn new(policy: SchemaPolicy) -> Self {
        Self { policy }
    }

    /// Resolve each canonical level against the collection's columns.
    pub fn resolve(&self, collection: &BoundaryCollection) -> Result<[FieldResolution; 3]> {
        let resolutions = RegionLevel::ALL.map(|level| resolve_field(collection.columns(), level.candidates()));

        for (level, resolution) in RegionLevel::ALL.iter().zip(&resolutions) {
            match resolution {
                FieldResolution::Resolved(column) => {
                    tracing::debug!(field = level.header(), column = %column, "resolved region column");
                }
                FieldResolution::Unresolved if self.policy == SchemaPolicy::Strict => {
                    return Err(AdmError::configuration(format!(
                        "no source column matches {:?} (columns: {:?})",
                        level.header(),
                        collection.columns(),
                    )).into());
                }
                FieldResolution::Unresolved => {
                    tracing::warn!(field = level.header(), columns = ?collection.columns(),
                        "no source column matches; filling with null marker");
                }
            }
        }

        Ok(resolutions)
    }

    /// Produce canonical names + geometry for every feature.
    pub fn normalize(&self, collection: BoundaryCollection) -> Result<Vec<NormalizedFeature>> {
        let [state, district, subdistrict] = self.resolve(&collection)?;

        /// Trimmed value of a resolved column, or the null marker when absent or blank.
        fn value(feature: &crate::geom::BoundaryFeature, resolution: &FieldResolution) -> String {
            match resolution {
                FieldResolution::Resolved(column) => feature.property(column)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .unwrap_or(NULL_MARKER)
                    .to_string(),
                FieldResolution::Unresolved => NULL_MARKER.to_string(),
            }
        }

        Ok(collection.into_features().into_iter()
            .map(|feature| NormalizedFeature {
                names: RegionNames {
                    state: value(&feature, &state),
                    district: value(&feature, &district),
                    subdistrict: value(&feature, &subdistrict),
                },
                geometry: feature.geometry,
            })
            .collect())
    }
}
