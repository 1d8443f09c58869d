//! Configuration system for qibla with validation and engine settings resolution.
//!
//! Settings are read from `qibla.toml`, searched in:
//! 1. the directory given with `--config <dir>`, if any
//! 2. **XDG_CONFIG_HOME**/qibla/qibla.toml
//!
//! A commented default file is written on first load. An optional `geo.toml`
//! next to it holds `latitude`/`longitude` separately, so the main file can be
//! shared without revealing where its owner lives.
//!
//! ## Configuration Structure
//!
//! ```toml
//! #[Alignment]
//! alignment_threshold = 10    # Degrees off target that still count as aligned (1-45)
//!
//! #[Fallback heading]
//! grace_period_ms = 3000      # Wait for compass data before simulating (500-30000)ms
//! simulator_tick_ms = 100     # Simulated heading update interval (10-1000)ms
//! simulator_step = 1.0        # Degrees per simulated tick (0.1-45)
//!
//! #[Location]
//! latitude = 51.507400        # Static location used for the fix
//! longitude = -0.127800
//! location_timeout_ms = 10000 # Give up on a location request after (1000-120000)ms
//! location_max_age_ms = 60000 # Accept a cached fix up to this age
//! high_accuracy = true        # Ask for the most accurate fix available
//!
//! #[Target]
//! target_latitude = 21.4225   # Point the bearing is computed towards
//! target_longitude = 39.8262
//! ```
//!
//! Every field is optional. Values are range-checked by
//! [`validation::validate_config`] and missing ones are filled from
//! `common::constants`.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::constants::*;
use crate::geo::{GeoCoordinate, format_coordinate};
use crate::providers::FixOptions;
use crate::session::EngineSettings;

pub use builder::{create_default_config, update_coordinates};
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};

/// Optional geo.toml next to qibla.toml holding private coordinates.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
}

/// Settings loaded from `qibla.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Degrees; accuracy strictly below this counts as aligned.
    pub alignment_threshold: Option<f64>,
    pub grace_period_ms: Option<u64>,
    pub simulator_tick_ms: Option<u64>,
    pub simulator_step: Option<f64>, // degrees per tick

    /// Static location for the fixed location provider.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_timeout_ms: Option<u64>,
    pub location_max_age_ms: Option<u64>,
    pub high_accuracy: Option<bool>,

    /// Bearing target. Defaults to the Kaaba.
    pub target_latitude: Option<f64>,
    pub target_longitude: Option<f64>,
}

impl Config {
    /// Get the path to the geo.toml file (in the same directory as qibla.toml)
    pub fn get_geo_path() -> Result<PathBuf> {
        Ok(loading::get_config_base_dir()?.join("geo.toml"))
    }

    pub fn load() -> Result<Self> {
        load()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        load_from_path(path)
    }

    /// The configured static location, if both coordinates are present.
    pub fn location(&self) -> Result<Option<GeoCoordinate>> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Ok(Some(GeoCoordinate::new(lat, lon)?)),
            _ => Ok(None),
        }
    }

    /// The bearing target, the Kaaba unless overridden.
    pub fn target(&self) -> Result<GeoCoordinate> {
        match (self.target_latitude, self.target_longitude) {
            (Some(lat), Some(lon)) => Ok(GeoCoordinate::new(lat, lon)?),
            _ => Ok(KAABA),
        }
    }

    /// Resolve the engine tunables, filling gaps with defaults.
    pub fn engine_settings(&self) -> Result<EngineSettings> {
        Ok(EngineSettings {
            target: self.target()?,
            alignment_threshold: self
                .alignment_threshold
                .unwrap_or(DEFAULT_ALIGNMENT_THRESHOLD),
            grace_period: Duration::from_millis(
                self.grace_period_ms.unwrap_or(DEFAULT_GRACE_PERIOD_MS),
            ),
            simulator_tick: Duration::from_millis(
                self.simulator_tick_ms.unwrap_or(DEFAULT_SIMULATOR_TICK_MS),
            ),
            simulator_step: self.simulator_step.unwrap_or(DEFAULT_SIMULATOR_STEP),
        })
    }

    pub fn fix_options(&self) -> FixOptions {
        FixOptions {
            high_accuracy: self.high_accuracy.unwrap_or(DEFAULT_HIGH_ACCURACY),
            timeout: Duration::from_millis(
                self.location_timeout_ms
                    .unwrap_or(DEFAULT_LOCATION_TIMEOUT_MS),
            ),
            max_age: Duration::from_millis(
                self.location_max_age_ms
                    .unwrap_or(DEFAULT_LOCATION_MAX_AGE_MS),
            ),
        }
    }

    pub fn log_config(&self) {
        let source = match get_custom_config_dir() {
            Some(dir) => format!("configuration from {}", crate::common::utils::private_path(&dir)),
            None => "default configuration".to_string(),
        };
        log_block_start!("Loaded {}", source);

        if let Ok(geo_path) = Self::get_geo_path()
            && geo_path.exists()
        {
            log_indented!("Loaded coordinates from geo.toml");
        }

        match self.location() {
            Ok(Some(location)) => log_indented!("Location: {}", format_coordinate(&location)),
            _ => log_indented!("Location: not configured"),
        }

        if self.target_latitude.is_some()
            && let Ok(target) = self.target()
        {
            log_indented!("Target: {}", format_coordinate(&target));
        }

        log_indented!(
            "Alignment threshold: {}°",
            self.alignment_threshold
                .unwrap_or(DEFAULT_ALIGNMENT_THRESHOLD)
        );
        log_indented!(
            "Grace period: {}ms",
            self.grace_period_ms.unwrap_or(DEFAULT_GRACE_PERIOD_MS)
        );
        log_indented!(
            "Simulated heading: {}° every {}ms",
            self.simulator_step.unwrap_or(DEFAULT_SIMULATOR_STEP),
            self.simulator_tick_ms.unwrap_or(DEFAULT_SIMULATOR_TICK_MS)
        );
    }
}
