//! Handle the locate command: one location fix, one solution, printed.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::args::LocateOptions;
use crate::config::{self, Config};
use crate::geo::{
    FixQuality, GeoCoordinate, QiblaSolution, cardinal_direction, format_coordinate, solve,
};
use crate::providers::{FixedLocationProvider, LocationProvider};

/// Machine-readable output of `locate --json`.
#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub location: GeoCoordinate,
    pub target: GeoCoordinate,
    pub bearing_degrees: f64,
    pub direction: &'static str,
    pub distance_km: u64,
    pub fix_quality: FixQuality,
}

impl LocateReport {
    pub fn new(
        location: GeoCoordinate,
        target: GeoCoordinate,
        solution: QiblaSolution,
        fix_quality: FixQuality,
    ) -> Self {
        Self {
            location,
            target,
            bearing_degrees: solution.bearing_degrees,
            direction: cardinal_direction(solution.bearing_degrees),
            distance_km: solution.distance_km,
            fix_quality,
        }
    }
}

/// Handle the locate command from the CLI.
pub fn handle_locate_command(options: &LocateOptions, debug_enabled: bool) -> Result<()> {
    let config = Config::load()?;
    if !options.json {
        config.log_config();
    }

    let location = super::resolve_location(options.latitude, options.longitude, &config)?;

    if options.save
        && let Some(location) = location
    {
        config::update_coordinates(location.latitude(), location.longitude())?;
    }

    let mut provider = FixedLocationProvider::new(location);
    let fix = provider
        .current_fix(&config.fix_options())
        .context("No location available. Pass --lat/--lon or set latitude and longitude in qibla.toml")?;

    let target = config.target()?;
    let solution = solve(fix.coordinate, target);
    let report = LocateReport::new(
        fix.coordinate,
        target,
        solution,
        FixQuality::from_accuracy_meters(fix.accuracy_meters),
    );

    if debug_enabled {
        log_debug!("Target: {}", format_coordinate(&target));
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    log_block_start!("Location: {}", format_coordinate(&report.location));
    log_decorated!(
        "Qibla bearing: {:.2}° ({})",
        report.bearing_degrees,
        report.direction
    );
    log_decorated!("Distance: {} km", report.distance_km);
    log_end!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::KAABA;
    use crate::common::constants::test_constants::*;

    #[test]
    fn test_report_fields() {
        let solution = solve(TEST_NEAR_ORIGIN, KAABA);
        let report = LocateReport::new(TEST_NEAR_ORIGIN, KAABA, solution, FixQuality::Unknown);

        assert_eq!(report.distance_km, TEST_NEAR_DISTANCE_KM);
        assert_eq!(report.direction, "NE");
        assert!((report.bearing_degrees - TEST_NEAR_BEARING).abs() < 1e-4);
    }

    #[test]
    fn test_report_serializes() {
        let solution = solve(TEST_LONDON, KAABA);
        let report = LocateReport::new(TEST_LONDON, KAABA, solution, FixQuality::Good);
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();

        assert_eq!(json["direction"], "SE");
        assert_eq!(json["fix_quality"], "good");
        assert!(json["distance_km"].as_u64().unwrap() > 4000);
    }
}
