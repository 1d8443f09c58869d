//! Command-line command handlers for qibla.
//!
//! - [`locate`]: one-shot bearing and distance for a location
//! - [`compass`]: a live compass session driven by recorded orientation events

pub mod compass;
pub mod locate;

use anyhow::Result;

use crate::config::Config;
use crate::geo::GeoCoordinate;

/// Location from `--lat/--lon` when given, otherwise from the configuration.
pub(crate) fn resolve_location(
    latitude: Option<f64>,
    longitude: Option<f64>,
    config: &Config,
) -> Result<Option<GeoCoordinate>> {
    match (latitude, longitude) {
        (Some(lat), Some(lon)) => Ok(Some(GeoCoordinate::new(lat, lon)?)),
        _ => config.location(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_coordinates_win_over_config() {
        let config = Config {
            latitude: Some(10.0),
            longitude: Some(20.0),
            ..Config::default()
        };

        let location = resolve_location(Some(-6.2088), Some(106.8456), &config)
            .unwrap()
            .unwrap();
        assert_eq!(location.latitude(), -6.2088);

        let location = resolve_location(None, None, &config).unwrap().unwrap();
        assert_eq!(location.longitude(), 20.0);
    }

    #[test]
    fn test_out_of_range_cli_coordinates_are_rejected() {
        let err = resolve_location(Some(95.0), Some(0.0), &Config::default()).unwrap_err();
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn test_no_location_anywhere() {
        assert_eq!(resolve_location(None, None, &Config::default()).unwrap(), None);
    }
}
