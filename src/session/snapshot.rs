//! The read model a consumer renders from.

use serde::Serialize;

use crate::alignment::AccuracyBand;
use crate::geo::FixQuality;
use crate::heading::HeadingSource;
use crate::permission::PermissionState;
use crate::providers::LocationError;

/// Everything a compass screen needs, taken at one instant.
///
/// Bearing, distance and accuracy are `None` until a location fix exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QiblaSnapshot {
    pub heading_degrees: Option<f64>,
    pub heading_source: Option<HeadingSource>,
    pub qibla_bearing_degrees: Option<f64>,
    /// 8-point compass direction of the bearing.
    pub qibla_direction: Option<&'static str>,
    pub distance_km: Option<u64>,
    pub accuracy_degrees: Option<f64>,
    pub accuracy_band: Option<AccuracyBand>,
    pub aligned: bool,
    /// The tracker entered alignment while processing the most recent pump.
    pub alignment_just_entered: bool,
    pub permission_state: PermissionState,
    /// Headings currently come from the simulator.
    pub using_fallback: bool,
    pub has_location: bool,
    pub location_error: Option<LocationError>,
    pub fix_quality: Option<FixQuality>,
}

impl QiblaSnapshot {
    /// Guidance line for the current accuracy, if there is one to give.
    pub fn guidance(&self) -> Option<&'static str> {
        if self.using_fallback {
            return None;
        }
        self.accuracy_band.map(|band| band.message())
    }
}
