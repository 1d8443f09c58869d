//! Location provider backed by a known coordinate.
//!
//! On a desktop there is no GPS; the position comes from `qibla.toml` or from
//! `--lat/--lon` on the command line.

use super::{FixOptions, LocationError, LocationFix, LocationProvider};
use crate::geo::GeoCoordinate;

#[derive(Debug, Clone)]
pub struct FixedLocationProvider {
    coordinate: Option<GeoCoordinate>,
    accuracy_meters: Option<f64>,
}

impl FixedLocationProvider {
    pub fn new(coordinate: Option<GeoCoordinate>) -> Self {
        Self {
            coordinate,
            accuracy_meters: None,
        }
    }

    /// Report this horizontal accuracy with every fix.
    pub fn with_accuracy(mut self, meters: f64) -> Self {
        self.accuracy_meters = Some(meters);
        self
    }
}

impl LocationProvider for FixedLocationProvider {
    fn current_fix(&mut self, _options: &FixOptions) -> Result<LocationFix, LocationError> {
        self.coordinate
            .map(|coordinate| LocationFix {
                coordinate,
                accuracy_meters: self.accuracy_meters,
            })
            .ok_or(LocationError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn options() -> FixOptions {
        FixOptions {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            max_age: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_configured_coordinate_is_returned() {
        let coordinate = GeoCoordinate::new(51.5074, -0.1278).unwrap();
        let mut provider = FixedLocationProvider::new(Some(coordinate)).with_accuracy(15.0);

        let fix = provider.current_fix(&options()).unwrap();
        assert_eq!(fix.coordinate, coordinate);
        assert_eq!(fix.accuracy_meters, Some(15.0));
    }

    #[test]
    fn test_missing_coordinate_is_unavailable() {
        let mut provider = FixedLocationProvider::new(None);
        assert_eq!(
            provider.current_fix(&options()),
            Err(LocationError::Unavailable)
        );
    }
}
