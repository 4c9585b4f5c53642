//! Geographic helpers: parcel coordinate lookup and great-circle distance.

use crate::error::Anomaly;
use crate::table::Table;
use serde::{Deserialize, Serialize};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLong {
    pub lat: f64,
    pub long: f64,
}

impl LatLong {
    /// Build a point, rejecting non-finite coordinates.
    pub fn new(lat: f64, long: f64) -> Option<Self> {
        (lat.is_finite() && long.is_finite()).then_some(Self { lat, long })
    }

    /// Build a point from nullable cells.
    pub fn from_cells(lat: Option<f64>, long: Option<f64>) -> Option<Self> {
        Self::new(lat?, long?)
    }

    /// Round both coordinates to two decimal places.
    pub fn rounded(self) -> Self {
        Self {
            lat: round2(self.lat),
            long: round2(self.long),
        }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: LatLong, b: LatLong) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = lat2 - lat1;
    let dlong = (b.long - a.long).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlong / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Column names used to locate a parcel's coordinates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoColumns {
    pub id: String,
    pub latitude: String,
    pub longitude: String,
}

impl Default for GeoColumns {
    fn default() -> Self {
        Self {
            id: "Land_ID".to_string(),
            latitude: "Latitude".to_string(),
            longitude: "Longitude".to_string(),
        }
    }
}

/// Coordinates of the row at `row`, if both cells are present and finite.
pub(crate) fn coordinates_at(table: &Table, columns: &GeoColumns, row: usize) -> Option<LatLong> {
    let lat = table.column(&columns.latitude)?.to_numeric();
    let long = table.column(&columns.longitude)?.to_numeric();
    LatLong::from_cells(lat.as_numeric()?[row], long.as_numeric()?[row])
}

/// Resolve a parcel ID to its coordinates, rounded to two decimals.
///
/// Returns `None` (and logs a `LookupMiss`) when the ID is absent or the row
/// has no usable coordinates; callers skip such IDs.
pub fn lookup(table: &Table, columns: &GeoColumns, land_id: i64) -> Option<LatLong> {
    let found = table
        .row_position(&columns.id, land_id)
        .and_then(|row| coordinates_at(table, columns, row));

    if found.is_none() {
        Anomaly::LookupMiss { land_id }.emit();
    }
    found.map(LatLong::rounded)
}
