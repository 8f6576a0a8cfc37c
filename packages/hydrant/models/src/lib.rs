#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and hydrant record types.
//!
//! These are the plain values passed between the catalog, the nearest
//! neighbor selector, the map request builder, and the result formatter.
//! [`HydrantRecord`]s are owned by the catalog for the whole process
//! lifetime; [`RankedHydrant`] borrows them for the duration of a single
//! query.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Arbitrary extra properties carried by a hydrant (pressure, type, ...).
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Errors from constructing a [`Coordinate`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    /// Latitude outside `[-90, 90]` or not a finite number.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    /// Longitude outside `[-180, 180]` or not a finite number.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// A WGS84 point.
///
/// Always holds a latitude in `[-90, 90]` and a longitude in
/// `[-180, 180]`; the only way to build one is through [`Coordinate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", rename_all = "camelCase")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = CoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    /// Creates a coordinate from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinateError`] if either component is out of range or
    /// not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A known fire hydrant, loaded once from the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrantRecord {
    /// Opaque identifier: the feature `id` when present, otherwise the
    /// feature's position in the source collection.
    pub id: String,
    /// Hydrant location.
    pub coordinate: Coordinate,
    /// Human-readable label from the `label` property.
    pub label: String,
    /// Every other feature property, passed through verbatim.
    pub attributes: Attributes,
}

/// A hydrant selected for one query, with its distances from the query
/// point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedHydrant<'a> {
    /// The catalog record.
    pub record: &'a HydrantRecord,
    /// Euclidean distance in raw degrees, used only for ranking.
    pub planar_distance: f64,
    /// Great-circle distance in whole meters, used for display.
    pub geodesic_meters: u64,
}

/// One line of the answer shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    /// Hydrant label.
    pub label: String,
    /// Great-circle distance from the query point in meters.
    pub distance_meters: u64,
    /// Map deep link centered on the hydrant.
    pub link_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundary_values() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(CoordinateError::Latitude(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::Longitude(-180.5))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Coordinate =
            serde_json::from_str(r#"{"latitude": 52.96, "longitude": 36.06}"#).unwrap();
        assert!((ok.latitude() - 52.96).abs() < f64::EPSILON);

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude": 120.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_entry_serializes_camel_case() {
        let entry = DisplayEntry {
            rank: 1,
            label: "Гидрант 1".to_string(),
            distance_meters: 105,
            link_url: "https://yandex.ru/maps/?pt=36.062,52.9648&z=18".to_string(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["distanceMeters"], 105);
        assert_eq!(json["linkUrl"], entry.link_url);
    }
}
