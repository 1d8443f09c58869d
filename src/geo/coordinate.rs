//! Validated latitude/longitude pairs.

use serde::Serialize;
use std::fmt;

/// A point on the Earth's surface in decimal degrees.
///
/// Immutable once built. `GeoCoordinate::new` rejects values outside
/// `[-90, 90]` / `[-180, 180]` and non-finite input, so every downstream
/// calculation can assume a valid domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoCoordinate {
    latitude_degrees: f64,
    longitude_degrees: f64,
}

/// Reason a coordinate pair was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateError::LatitudeOutOfRange(lat) => {
                write!(f, "latitude must be between -90 and 90 degrees (got {lat})")
            }
            CoordinateError::LongitudeOutOfRange(lon) => {
                write!(f, "longitude must be between -180 and 180 degrees (got {lon})")
            }
        }
    }
}

impl std::error::Error for CoordinateError {}

impl GeoCoordinate {
    /// Build a coordinate, validating both ranges.
    pub fn new(latitude_degrees: f64, longitude_degrees: f64) -> Result<Self, CoordinateError> {
        // `contains` is false for NaN, so non-finite input is rejected here too
        if !(-90.0..=90.0).contains(&latitude_degrees) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude_degrees));
        }
        if !(-180.0..=180.0).contains(&longitude_degrees) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude_degrees));
        }
        Ok(Self {
            latitude_degrees,
            longitude_degrees,
        })
    }

    /// Build a coordinate from values known to be in range at compile time.
    pub(crate) const fn new_unchecked(latitude_degrees: f64, longitude_degrees: f64) -> Self {
        Self {
            latitude_degrees,
            longitude_degrees,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude_degrees
    }

    pub fn longitude(&self) -> f64 {
        self.longitude_degrees
    }

    /// Latitude and longitude in radians, in that order.
    pub(crate) fn to_radians(self) -> (f64, f64) {
        (
            self.latitude_degrees.to_radians(),
            self.longitude_degrees.to_radians(),
        )
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", super::display::format_coordinate(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(GeoCoordinate::new(40.7128, -74.0060).is_ok());
        assert!(GeoCoordinate::new(90.0, 180.0).is_ok());
        assert!(GeoCoordinate::new(-90.0, -180.0).is_ok());

        assert_eq!(
            GeoCoordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            GeoCoordinate::new(0.0, -181.0),
            Err(CoordinateError::LongitudeOutOfRange(-181.0))
        );
        assert!(GeoCoordinate::new(f64::NAN, 0.0).is_err());
        assert!(GeoCoordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_coordinate_serialization() {
        let coord = GeoCoordinate::new(21.4225, 39.8262).unwrap();
        let json = serde_json::to_string(&coord).unwrap();
        assert!(json.contains("\"latitude_degrees\":21.4225"));
        assert!(json.contains("\"longitude_degrees\":39.8262"));
    }
}
