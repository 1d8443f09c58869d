//! Formatting and display utilities for coordinates, bearings and fixes.

use serde::Serialize;

use super::GeoCoordinate;
use crate::common::constants::{FIX_EXCELLENT_METERS, FIX_FAIR_METERS, FIX_GOOD_METERS};

const CARDINALS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Nearest 8-point compass direction for a bearing in degrees.
///
/// Each sector is 45° wide and centered on its direction, so `N` covers
/// `[337.5, 22.5)`.
pub fn cardinal_direction(bearing_degrees: f64) -> &'static str {
    let bearing = crate::common::utils::normalize_degrees(bearing_degrees);
    let index = ((bearing + 22.5) / 45.0).floor() as usize % CARDINALS.len();
    CARDINALS[index]
}

/// Render a coordinate as `21.4225°N, 39.8262°E`.
pub fn format_coordinate(coordinate: &GeoCoordinate) -> String {
    let lat = coordinate.latitude();
    let lon = coordinate.longitude();
    let lat_dir = if lat >= 0.0 { "N" } else { "S" };
    let lon_dir = if lon >= 0.0 { "E" } else { "W" };
    format!("{:.4}°{}, {:.4}°{}", lat.abs(), lat_dir, lon.abs(), lon_dir)
}

/// Quality grade of a location fix, from its reported horizontal accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixQuality {
    Excellent,
    Good,
    Fair,
    Poor,
    /// The provider did not report an accuracy radius.
    Unknown,
}

impl FixQuality {
    pub fn from_accuracy_meters(accuracy: Option<f64>) -> Self {
        match accuracy {
            Some(meters) if !meters.is_finite() || meters < 0.0 => FixQuality::Unknown,
            Some(meters) if meters <= FIX_EXCELLENT_METERS => FixQuality::Excellent,
            Some(meters) if meters <= FIX_GOOD_METERS => FixQuality::Good,
            Some(meters) if meters <= FIX_FAIR_METERS => FixQuality::Fair,
            Some(_) => FixQuality::Poor,
            None => FixQuality::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FixQuality::Excellent => "Excellent",
            FixQuality::Good => "Good",
            FixQuality::Fair => "Fair",
            FixQuality::Poor => "Poor",
            FixQuality::Unknown => "Unknown",
        }
    }
}
