//! Great-circle bearing and haversine distance.
//!
//! Both functions are pure and total over valid coordinates. They take the
//! target as an argument; the engine passes the configured target (the Kaaba by
//! default) through `solve`.

use serde::Serialize;

use super::GeoCoordinate;
use crate::common::constants::EARTH_RADIUS_KM;
use crate::common::utils::normalize_degrees;

/// Direction and distance from a location fix to the target.
///
/// Derived once per fix and only recomputed when the fix changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QiblaSolution {
    /// Initial great-circle bearing, clockwise from true north, in `[0, 360)`.
    pub bearing_degrees: f64,
    /// Great-circle distance rounded to whole kilometers.
    pub distance_km: u64,
}

/// Initial bearing from `origin` to `target` along the great circle.
///
/// Returns degrees clockwise from true north in `[0, 360)`. Identical points
/// give `atan2(0, 0) == 0`, a stable value for the degenerate case.
pub fn compute_bearing(origin: GeoCoordinate, target: GeoCoordinate) -> f64 {
    let (lat_origin, lon_origin) = origin.to_radians();
    let (lat_target, lon_target) = target.to_radians();
    let delta_lon = lon_target - lon_origin;

    let y = delta_lon.sin() * lat_target.cos();
    let x = lat_origin.cos() * lat_target.sin()
        - lat_origin.sin() * lat_target.cos() * delta_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Haversine distance between two points, rounded to the nearest kilometer.
///
/// Symmetric in its arguments and zero for identical points.
pub fn compute_distance_km(a: GeoCoordinate, b: GeoCoordinate) -> u64 {
    let (lat_a, lon_a) = a.to_radians();
    let (lat_b, lon_b) = b.to_radians();
    let delta_lat = lat_b - lat_a;
    let delta_lon = lon_b - lon_a;

    let haversine = (delta_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push the term a hair outside [0, 1] for antipodal points
    let haversine = haversine.clamp(0.0, 1.0);
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    (EARTH_RADIUS_KM * central_angle).round() as u64
}

/// Bearing and distance from `origin` to `target` in one value.
pub fn solve(origin: GeoCoordinate, target: GeoCoordinate) -> QiblaSolution {
    QiblaSolution {
        bearing_degrees: compute_bearing(origin, target),
        distance_km: compute_distance_km(origin, target),
    }
}
