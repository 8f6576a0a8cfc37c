#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Distance functions between coordinates.
//!
//! Two tiers are provided:
//!
//! - [`planar_distance`] treats `(latitude, longitude)` as a flat plane and
//!   returns a Euclidean distance in raw degrees. It is only meaningful for
//!   ordering candidates over a city-sized area and is not corrected for
//!   longitude compression away from the equator.
//! - [`geodesic_meters`] is the haversine great-circle distance, computed
//!   only for the handful of results actually shown to the user.

use hydrant_map_hydrant_models::Coordinate;

/// Mean Earth radius in meters used by [`geodesic_meters`].
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Euclidean distance between two coordinates in degree units.
#[must_use]
pub fn planar_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    (a.latitude() - b.latitude()).hypot(a.longitude() - b.longitude())
}

/// Great-circle distance between two coordinates, rounded to the nearest
/// meter.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn geodesic_meters(a: &Coordinate, b: &Coordinate) -> u64 {
    let phi1 = a.latitude().to_radians();
    let phi2 = b.latitude().to_radians();
    let d_phi = (b.latitude() - a.latitude()).to_radians();
    let d_lambda = (b.longitude() - a.longitude()).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding error can push `h` a hair past 1.0 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    // Non-negative and bounded by half the circumference.
    (EARTH_RADIUS_METERS * c).round() as u64
}
