//! Application-wide constants: engine defaults and validation limits.
//!
//! Everything here is a default. The engine itself never reads these directly;
//! values reach it through `EngineSettings`, so tests and configuration can
//! substitute other targets and thresholds.

use crate::geo::GeoCoordinate;

// # Reference target

/// The Kaaba, Masjid al-Haram, Makkah.
pub const KAABA: GeoCoordinate = GeoCoordinate::new_unchecked(21.4225, 39.8262);

/// Mean Earth radius used by the haversine distance, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

// # Alignment

/// Accuracy below which the device counts as facing the target.
pub const DEFAULT_ALIGNMENT_THRESHOLD: f64 = 10.0;
pub const MINIMUM_ALIGNMENT_THRESHOLD: f64 = 1.0;
pub const MAXIMUM_ALIGNMENT_THRESHOLD: f64 = 45.0;

// # Fallback simulator

/// How long to wait for a first real heading sample after subscribing before
/// the simulator takes over.
pub const DEFAULT_GRACE_PERIOD_MS: u64 = 3000;
pub const MINIMUM_GRACE_PERIOD_MS: u64 = 500;
pub const MAXIMUM_GRACE_PERIOD_MS: u64 = 30_000;

pub const DEFAULT_SIMULATOR_TICK_MS: u64 = 100;
pub const MINIMUM_SIMULATOR_TICK_MS: u64 = 10;
pub const MAXIMUM_SIMULATOR_TICK_MS: u64 = 1000;

/// Degrees added to the synthetic heading on every tick.
pub const DEFAULT_SIMULATOR_STEP: f64 = 1.0;
pub const MINIMUM_SIMULATOR_STEP: f64 = 0.1;
pub const MAXIMUM_SIMULATOR_STEP: f64 = 45.0;

// # Location request

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_LOCATION_MAX_AGE_MS: u64 = 60_000;
pub const DEFAULT_HIGH_ACCURACY: bool = true;
pub const MINIMUM_LOCATION_TIMEOUT_MS: u64 = 1000;
pub const MAXIMUM_LOCATION_TIMEOUT_MS: u64 = 120_000;

// # Accuracy bands (degrees off target)

pub const ACCURACY_PERFECT: f64 = 5.0;
pub const ACCURACY_EXCELLENT: f64 = 10.0;
pub const ACCURACY_GOOD: f64 = 20.0;
pub const ACCURACY_FAIR: f64 = 45.0;

// # Location fix quality (meters)

pub const FIX_EXCELLENT_METERS: f64 = 10.0;
pub const FIX_GOOD_METERS: f64 = 50.0;
pub const FIX_FAIR_METERS: f64 = 100.0;

// # Process

pub const EXIT_FAILURE: i32 = 1;

/// Poll interval of the compass command loop when no event is pending.
pub const COMPASS_POLL_INTERVAL_MS: u64 = 50;

#[cfg(test)]
pub mod test_constants {
    use crate::geo::GeoCoordinate;

    /// A point roughly 100 km south-west of the Kaaba.
    pub const TEST_NEAR_ORIGIN: GeoCoordinate = GeoCoordinate::new_unchecked(21.0, 39.0);
    pub const TEST_NEAR_BEARING: f64 = 61.104_503;
    pub const TEST_NEAR_DISTANCE_KM: u64 = 98;

    pub const TEST_LONDON: GeoCoordinate = GeoCoordinate::new_unchecked(51.5074, -0.1278);
    pub const TEST_NEW_YORK: GeoCoordinate = GeoCoordinate::new_unchecked(40.7128, -74.0060);
    pub const TEST_JAKARTA: GeoCoordinate = GeoCoordinate::new_unchecked(-6.2088, 106.8456);
    pub const TEST_SYDNEY: GeoCoordinate = GeoCoordinate::new_unchecked(-33.8688, 151.2093);
}
