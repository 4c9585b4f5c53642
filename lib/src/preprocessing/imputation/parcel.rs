//! Parcel attribute imputer.
//!
//! Fills the designated nullable parcel attributes with fixed defaults and
//! imputes missing soil types from the geographically nearest parcel with a
//! known soil type.
//!
//! # Example
//! ```ignore
//! use parcel_features::preprocessing::{Imputer, ImputeConfig, SoilPolicy};
//!
//! let imputer = Imputer::new(ImputeConfig {
//!     soil_policy: SoilPolicy::Nearest { radius_km: 25.0 },
//!     ..ImputeConfig::default()
//! })?;
//! let imputed = imputer.impute(&cleaned)?;
//! ```

use crate::error::{Anomaly, PipelineError, Result};
use crate::geo::{haversine_km, GeoColumns, LatLong};
use crate::table::{Column, Table};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How missing soil types are filled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SoilPolicy {
    /// Copy the soil type of the nearest parcel with a known soil type if it
    /// lies within `radius_km`; otherwise use the default category.
    Nearest { radius_km: f64 },
    /// Always use the default category.
    Fixed,
}

impl Default for SoilPolicy {
    fn default() -> Self {
        SoilPolicy::Nearest { radius_km: 50.0 }
    }
}

/// Imputer settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ImputeConfig {
    /// Primary key column, used to name rows in anomalies.
    pub id_column: String,
    /// Coordinate columns used by [`SoilPolicy::Nearest`].
    pub geo: GeoColumns,
    pub soil_column: String,
    pub soil_policy: SoilPolicy,
    /// Category used when no neighbor qualifies.
    pub default_soil: String,
    /// Numeric columns and the value that replaces their nulls.
    pub numeric_fills: BTreeMap<String, f64>,
    /// Text columns and the value that replaces their nulls.
    pub text_fills: BTreeMap<String, String>,
    /// Text columns whose values are lowercased.
    pub lowercase_columns: Vec<String>,
}

impl Default for ImputeConfig {
    fn default() -> Self {
        Self {
            id_column: "Land_ID".to_string(),
            geo: GeoColumns::default(),
            soil_column: "Soil_Type".to_string(),
            soil_policy: SoilPolicy::default(),
            default_soil: "unknown".to_string(),
            numeric_fills: BTreeMap::from([
                ("Water_Source_Data".to_string(), 0.0),
                ("Approach_Road_Length".to_string(), 10.0),
                ("Land_Zone_Data".to_string(), 0.0),
            ]),
            text_fills: BTreeMap::from([(
                "Approach_Road_Type".to_string(),
                "unpaved".to_string(),
            )]),
            lowercase_columns: ["Soil_Type", "Approach_Road_Type", "State", "District"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Output of [`Imputer::impute`].
#[derive(Clone, Debug)]
pub struct Imputed {
    pub table: Table,
    pub anomalies: Vec<Anomaly>,
    /// Soil types copied from a neighbor.
    pub soil_from_neighbors: usize,
    /// Soil types set to the default category.
    pub soil_defaulted: usize,
}

/// Fills nulls in the designated parcel columns. Running it twice gives the
/// same table as running it once.
#[derive(Clone, Debug)]
pub struct Imputer {
    config: ImputeConfig,
}

impl Imputer {
    /// Build an imputer. The soil radius must be finite and non-negative.
    pub fn new(config: ImputeConfig) -> Result<Self> {
        if let SoilPolicy::Nearest { radius_km } = config.soil_policy {
            if !radius_km.is_finite() || radius_km < 0.0 {
                return Err(PipelineError::InvalidParameter(format!(
                    "soil radius must be a non-negative number of km, got {}",
                    radius_km
                )));
            }
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &ImputeConfig {
        &self.config
    }

    /// Impute `table`, returning a fresh table.
    pub fn impute(&self, table: &Table) -> Result<Imputed> {
        let mut out = table.clone();
        let mut anomalies = Vec::new();

        for (name, value) in &self.config.numeric_fills {
            if let Some(Column::Text(cells)) = out.column(name) {
                let failed = cells
                    .iter()
                    .flatten()
                    .filter(|s| s.trim().parse::<f64>().map_or(true, |x| !x.is_finite()))
                    .count();
                if failed > 0 {
                    Anomaly::CoercionWarning {
                        column: name.clone(),
                        failed,
                    }
                    .record(&mut anomalies);
                }
            }
            out.ensure_float_column(name)?;
            if let Some(Column::Numeric(cells)) = out.column_mut(name) {
                cells.iter_mut().filter(|c| c.is_none()).for_each(|c| *c = Some(*value));
            }
        }

        for (name, value) in &self.config.text_fills {
            let mut cells = text_cells(&out, name);
            cells
                .iter_mut()
                .filter(|c| c.is_none())
                .for_each(|c| *c = Some(value.clone()));
            out.insert_column(name.as_str(), Column::Text(cells))?;
        }

        let (soil, from_neighbors, defaulted) = self.impute_soil(&out, &mut anomalies);
        out.insert_column(self.config.soil_column.as_str(), Column::Text(soil))?;

        for name in &self.config.lowercase_columns {
            if let Some(Column::Text(cells)) = out.column_mut(name) {
                for value in cells.iter_mut().flatten() {
                    *value = value.to_lowercase();
                }
            }
        }

        tracing::debug!(
            rows = out.n_rows(),
            soil_from_neighbors = from_neighbors,
            soil_defaulted = defaulted,
            "imputed table"
        );
        Ok(Imputed {
            table: out,
            anomalies,
            soil_from_neighbors: from_neighbors,
            soil_defaulted: defaulted,
        })
    }

    /// Filled soil column plus (neighbor-copied, defaulted) counts.
    fn impute_soil(
        &self,
        table: &Table,
        anomalies: &mut Vec<Anomaly>,
    ) -> (Vec<Option<String>>, usize, usize) {
        let known = text_cells(table, &self.config.soil_column);
        let coords = coordinates(table, &self.config.geo);

        // Donors are fixed before any row is filled
        let donors: Vec<(LatLong, &str)> = known
            .iter()
            .zip(&coords)
            .filter_map(|(soil, point)| Some(((*point)?, soil.as_deref()?)))
            .collect();

        let mut from_neighbors = 0;
        let mut defaulted = 0;
        let filled = known
            .iter()
            .enumerate()
            .map(|(row, soil)| {
                if soil.is_some() {
                    return soil.clone();
                }
                let neighbor = match (&self.config.soil_policy, coords[row]) {
                    (SoilPolicy::Nearest { radius_km }, Some(point)) => {
                        nearest(point, &donors).filter(|(d, _)| d <= radius_km)
                    }
                    _ => None,
                };
                match neighbor {
                    Some((_, soil)) => {
                        from_neighbors += 1;
                        Some(soil.to_string())
                    }
                    None => {
                        defaulted += 1;
                        if matches!(self.config.soil_policy, SoilPolicy::Nearest { .. }) {
                            Anomaly::ImputationGap {
                                land_id: table.id_at(&self.config.id_column, row),
                            }
                            .record(anomalies);
                        }
                        Some(self.config.default_soil.clone())
                    }
                }
            })
            .collect();

        (filled, from_neighbors, defaulted)
    }
}

/// Closest donor and its distance. Ties keep the earliest donor.
fn nearest<'a>(point: LatLong, donors: &[(LatLong, &'a str)]) -> Option<(f64, &'a str)> {
    let mut best: Option<(f64, &'a str)> = None;
    for &(donor, soil) in donors {
        let d = haversine_km(point, donor);
        if best.is_none_or(|(best_d, _)| d < best_d) {
            best = Some((d, soil));
        }
    }
    best
}

/// Text view of a column; numeric cells are rendered, absent columns are all null.
fn text_cells(table: &Table, name: &str) -> Vec<Option<String>> {
    match table.column(name) {
        Some(Column::Text(cells)) => cells.clone(),
        Some(column) => (0..column.len()).map(|row| column.cell_to_string(row)).collect(),
        None => vec![None; table.n_rows()],
    }
}

/// Per-row coordinates, converted once.
fn coordinates(table: &Table, geo: &GeoColumns) -> Vec<Option<LatLong>> {
    let (Some(lat), Some(long)) = (table.column(&geo.latitude), table.column(&geo.longitude))
    else {
        return vec![None; table.n_rows()];
    };
    let (lat, long) = (lat.to_numeric(), long.to_numeric());
    match (lat.as_numeric(), long.as_numeric()) {
        (Some(lat), Some(long)) => lat
            .iter()
            .zip(long)
            .map(|(&a, &b)| LatLong::from_cells(a, b))
            .collect(),
        _ => vec![None; table.n_rows()],
    }
}
