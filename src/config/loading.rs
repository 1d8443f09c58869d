//! Configuration loading functionality.
//!
//! Handles locating `qibla.toml`, creating it on first use, applying geo.toml
//! overrides and filling in defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::validation::validate_config;
use super::{Config, GeoConfig};
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically at startup.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Directory containing qibla.toml and geo.toml.
pub fn get_config_base_dir() -> Result<PathBuf> {
    let config_path = get_config_path()?;
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// Path of qibla.toml, honouring `--config`.
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join("qibla.toml"));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join("qibla").join("qibla.toml"))
}

/// Load configuration using automatic path detection.
///
/// Creates a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path).with_context(|| {
        format!(
            "Failed to load configuration from {}",
            private_path(&config_path)
        )
    })
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], a missing file is an error here.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", private_path(path));
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    // geo.toml values take part in validation like any other field
    load_geo_override_from_path(&mut config, path)?;

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

/// Apply default values to configuration fields.
///
/// Location and target coordinates are left alone: a missing location means
/// "no fix available", and a missing target means the Kaaba.
fn apply_defaults(config: &mut Config) {
    if config.alignment_threshold.is_none() {
        config.alignment_threshold = Some(DEFAULT_ALIGNMENT_THRESHOLD);
    }
    if config.grace_period_ms.is_none() {
        config.grace_period_ms = Some(DEFAULT_GRACE_PERIOD_MS);
    }
    if config.simulator_tick_ms.is_none() {
        config.simulator_tick_ms = Some(DEFAULT_SIMULATOR_TICK_MS);
    }
    if config.simulator_step.is_none() {
        config.simulator_step = Some(DEFAULT_SIMULATOR_STEP);
    }
    if config.location_timeout_ms.is_none() {
        config.location_timeout_ms = Some(DEFAULT_LOCATION_TIMEOUT_MS);
    }
    if config.location_max_age_ms.is_none() {
        config.location_max_age_ms = Some(DEFAULT_LOCATION_MAX_AGE_MS);
    }
    if config.high_accuracy.is_none() {
        config.high_accuracy = Some(DEFAULT_HIGH_ACCURACY);
    }
}

/// Load geo.toml from the directory of `config_path`, if present.
pub(crate) fn load_geo_override_from_path(config: &mut Config, config_path: &Path) -> Result<()> {
    let geo_path = if let Some(parent) = config_path.parent() {
        parent.join("geo.toml")
    } else {
        return Ok(());
    };

    if !geo_path.exists() {
        return Ok(());
    }

    match fs::read_to_string(&geo_path) {
        Ok(content) => match toml::from_str::<GeoConfig>(&content) {
            Ok(geo_config) => {
                if let Some(lat) = geo_config.latitude {
                    config.latitude = Some(lat);
                }
                if let Some(lon) = geo_config.longitude {
                    config.longitude = Some(lon);
                }
            }
            Err(e) => {
                log_warning!("Failed to parse geo.toml: {e}. Using coordinates from main config.");
            }
        },
        Err(e) => {
            log_warning!("Failed to read geo.toml: {e}. Using coordinates from main config.");
        }
    }

    Ok(())
}
