//! Configuration validation functionality.
//!
//! Range checks for every field, so a bad value is reported at load time with
//! the field name instead of surfacing later as odd engine behaviour.

use anyhow::Result;

use super::Config;
use crate::common::constants::*;

/// Validate every present field against its allowed range.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(threshold) = config.alignment_threshold
        && !(MINIMUM_ALIGNMENT_THRESHOLD..=MAXIMUM_ALIGNMENT_THRESHOLD).contains(&threshold)
    {
        anyhow::bail!(
            "alignment_threshold ({}°) must be between {}° and {}°",
            threshold,
            MINIMUM_ALIGNMENT_THRESHOLD,
            MAXIMUM_ALIGNMENT_THRESHOLD
        );
    }

    if let Some(grace) = config.grace_period_ms
        && !(MINIMUM_GRACE_PERIOD_MS..=MAXIMUM_GRACE_PERIOD_MS).contains(&grace)
    {
        anyhow::bail!(
            "grace_period_ms ({} ms) must be between {} and {} milliseconds",
            grace,
            MINIMUM_GRACE_PERIOD_MS,
            MAXIMUM_GRACE_PERIOD_MS
        );
    }

    if let Some(tick) = config.simulator_tick_ms
        && !(MINIMUM_SIMULATOR_TICK_MS..=MAXIMUM_SIMULATOR_TICK_MS).contains(&tick)
    {
        anyhow::bail!(
            "simulator_tick_ms ({} ms) must be between {} and {} milliseconds",
            tick,
            MINIMUM_SIMULATOR_TICK_MS,
            MAXIMUM_SIMULATOR_TICK_MS
        );
    }

    if let Some(step) = config.simulator_step
        && !(MINIMUM_SIMULATOR_STEP..=MAXIMUM_SIMULATOR_STEP).contains(&step)
    {
        anyhow::bail!(
            "simulator_step ({}°) must be between {}° and {}°",
            step,
            MINIMUM_SIMULATOR_STEP,
            MAXIMUM_SIMULATOR_STEP
        );
    }

    if let Some(timeout) = config.location_timeout_ms
        && !(MINIMUM_LOCATION_TIMEOUT_MS..=MAXIMUM_LOCATION_TIMEOUT_MS).contains(&timeout)
    {
        anyhow::bail!(
            "location_timeout_ms ({} ms) must be between {} and {} milliseconds",
            timeout,
            MINIMUM_LOCATION_TIMEOUT_MS,
            MAXIMUM_LOCATION_TIMEOUT_MS
        );
    }

    validate_coordinate_pair(config.latitude, config.longitude, "latitude", "longitude")?;
    validate_coordinate_pair(
        config.target_latitude,
        config.target_longitude,
        "target_latitude",
        "target_longitude",
    )?;

    Ok(())
}

/// Both halves of a coordinate must be given together and be in range.
fn validate_coordinate_pair(
    latitude: Option<f64>,
    longitude: Option<f64>,
    lat_name: &str,
    lon_name: &str,
) -> Result<()> {
    match (latitude, longitude) {
        (Some(_), None) => anyhow::bail!("{lat_name} is set but {lon_name} is missing"),
        (None, Some(_)) => anyhow::bail!("{lon_name} is set but {lat_name} is missing"),
        _ => {}
    }

    if let Some(lat) = latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        anyhow::bail!("{lat_name} must be between -90 and 90 degrees (got {lat})");
    }

    if let Some(lon) = longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        anyhow::bail!("{lon_name} must be between -180 and 180 degrees (got {lon})");
    }

    Ok(())
}
