//! Tunables injected into a session.

use std::time::Duration;

use crate::common::constants::*;
use crate::geo::GeoCoordinate;

/// Engine constants for one session.
///
/// Built from `qibla.toml` by `Config::engine_settings`; `Default` gives the
/// stock values with the Kaaba as target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Point the bearing and distance are computed towards.
    pub target: GeoCoordinate,
    /// Accuracy (degrees) strictly below which the device counts as aligned.
    pub alignment_threshold: f64,
    /// Wait for a first real sample after subscribing before simulating.
    pub grace_period: Duration,
    pub simulator_tick: Duration,
    /// Degrees per simulator tick.
    pub simulator_step: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            target: KAABA,
            alignment_threshold: DEFAULT_ALIGNMENT_THRESHOLD,
            grace_period: Duration::from_millis(DEFAULT_GRACE_PERIOD_MS),
            simulator_tick: Duration::from_millis(DEFAULT_SIMULATOR_TICK_MS),
            simulator_step: DEFAULT_SIMULATOR_STEP,
        }
    }
}
