//! Heading normalization for raw, platform-specific orientation events.
//!
//! Mobile orientation APIs disagree about what they report. Some platforms
//! expose a calibrated true-north compass heading, others only the magnetic
//! `alpha` angle, which grows counter-clockwise and therefore has the opposite
//! rotational sense of a compass. Some populate the true-north field only once
//! calibration has settled, so availability is probed on every event.
//!
//! All of that knowledge lives in [`NORMALIZATION_RULES`]: an ordered table of
//! rules, each of which either claims an event or passes. The first rule that
//! produces a heading wins. A new platform quirk is a new row in the table.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::common::utils::normalize_degrees;

/// Where a heading sample came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingSource {
    /// Calibrated compass heading referenced to true north.
    TrueNorthSensor,
    /// Derived from the magnetic `alpha` angle.
    MagneticNorthSensor,
    /// Produced by the fallback simulator.
    Simulated,
}

impl HeadingSource {
    /// Real sensors are the only sources allowed to report alignment.
    pub fn is_real(&self) -> bool {
        !matches!(self, HeadingSource::Simulated)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingSource::TrueNorthSensor => "true north",
            HeadingSource::MagneticNorthSensor => "magnetic",
            HeadingSource::Simulated => "simulated",
        }
    }
}

/// One canonical heading reading.
///
/// Each new sample supersedes the previous one; nothing accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadingSample {
    /// Clockwise from north, in `[0, 360)`.
    pub degrees: f64,
    pub source: HeadingSource,
    pub timestamp: DateTime<Local>,
}

impl HeadingSample {
    pub fn new(degrees: f64, source: HeadingSource, timestamp: DateTime<Local>) -> Self {
        Self {
            degrees: normalize_degrees(degrees),
            source,
            timestamp,
        }
    }
}

/// A raw orientation event as delivered by the platform.
///
/// Every field is optional because platforms fill them in inconsistently.
/// `beta` and `gamma` (device tilt) are carried for completeness but do not
/// take part in normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOrientationEvent {
    #[serde(default)]
    pub alpha: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    /// True-north compass heading, when the platform provides one.
    #[serde(default, alias = "webkit_compass_heading")]
    pub compass_heading: Option<f64>,
}

impl RawOrientationEvent {
    pub fn with_alpha(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            ..Self::default()
        }
    }

    pub fn with_compass_heading(heading: f64) -> Self {
        Self {
            compass_heading: Some(heading),
            ..Self::default()
        }
    }
}

type NormalizationRule = fn(&RawOrientationEvent) -> Option<(f64, HeadingSource)>;

/// Rules evaluated in priority order; the first match produces the sample.
pub const NORMALIZATION_RULES: &[NormalizationRule] = &[true_north_rule, magnetic_alpha_rule];

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Calibrated true-north heading is used as reported.
fn true_north_rule(event: &RawOrientationEvent) -> Option<(f64, HeadingSource)> {
    finite(event.compass_heading).map(|heading| (heading, HeadingSource::TrueNorthSensor))
}

/// Magnetic alpha is counter-clockwise; invert it into compass sense.
fn magnetic_alpha_rule(event: &RawOrientationEvent) -> Option<(f64, HeadingSource)> {
    finite(event.alpha).map(|alpha| (360.0 - alpha, HeadingSource::MagneticNorthSensor))
}

/// Converts raw orientation events into `HeadingSample`s.
#[derive(Debug, Default)]
pub struct HeadingNormalizer {
    dropped: u64,
}

impl HeadingNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one event, or `None` when no rule claims it.
    pub fn normalize(
        &mut self,
        event: &RawOrientationEvent,
        timestamp: DateTime<Local>,
    ) -> Option<HeadingSample> {
        let sample = NORMALIZATION_RULES
            .iter()
            .find_map(|rule| rule(event))
            .map(|(degrees, source)| HeadingSample::new(degrees, source, timestamp));

        if sample.is_none() {
            self.dropped += 1;
        }
        sample
    }

    /// Number of events dropped because they carried no usable heading.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
