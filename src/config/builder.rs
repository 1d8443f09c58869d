//! Default config creation and in-place coordinate updates.
//!
//! The default file is generated with [`ConfigBuilder`] so that comments stay
//! aligned whatever the constants in `common::constants` happen to be.
//! [`update_coordinates`] rewrites only the coordinate lines of an existing
//! file, keeping the user's comments and layout.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::{Config, get_config_path};
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Write a commented default configuration to `path`.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let config_content = ConfigBuilder::new()
        .add_section("Alignment")
        .add_setting(
            "alignment_threshold",
            &format!("{DEFAULT_ALIGNMENT_THRESHOLD:.1}"),
            &format!(
                "Degrees off target that still count as aligned ({MINIMUM_ALIGNMENT_THRESHOLD}-{MAXIMUM_ALIGNMENT_THRESHOLD})"
            ),
        )
        .add_section("Fallback heading")
        .add_setting(
            "grace_period_ms",
            &DEFAULT_GRACE_PERIOD_MS.to_string(),
            &format!(
                "Wait for compass data before simulating ({MINIMUM_GRACE_PERIOD_MS}-{MAXIMUM_GRACE_PERIOD_MS})ms"
            ),
        )
        .add_setting(
            "simulator_tick_ms",
            &DEFAULT_SIMULATOR_TICK_MS.to_string(),
            &format!(
                "Simulated heading update interval ({MINIMUM_SIMULATOR_TICK_MS}-{MAXIMUM_SIMULATOR_TICK_MS})ms"
            ),
        )
        .add_setting(
            "simulator_step",
            &format!("{DEFAULT_SIMULATOR_STEP:.1}"),
            &format!(
                "Degrees per simulated tick ({MINIMUM_SIMULATOR_STEP}-{MAXIMUM_SIMULATOR_STEP})"
            ),
        )
        .add_section("Location")
        .add_comment("latitude = 0.0             # Static location (use 'qibla locate --save')")
        .add_comment("longitude = 0.0")
        .add_setting(
            "location_timeout_ms",
            &DEFAULT_LOCATION_TIMEOUT_MS.to_string(),
            &format!(
                "Give up on a location request after ({MINIMUM_LOCATION_TIMEOUT_MS}-{MAXIMUM_LOCATION_TIMEOUT_MS})ms"
            ),
        )
        .add_setting(
            "location_max_age_ms",
            &DEFAULT_LOCATION_MAX_AGE_MS.to_string(),
            "Accept a cached fix up to this age in milliseconds",
        )
        .add_setting(
            "high_accuracy",
            &DEFAULT_HIGH_ACCURACY.to_string(),
            "Ask for the most accurate fix available",
        )
        .build();

    fs::write(path, config_content).context("Failed to write default config file")?;
    Ok(())
}

/// Store `latitude`/`longitude` as the static location.
///
/// Written to geo.toml when that file exists, otherwise into qibla.toml with
/// existing comment alignment preserved.
pub fn update_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    let config_path = get_config_path()?;
    let geo_path = Config::get_geo_path()?;

    if !config_path.exists() {
        anyhow::bail!(
            "No existing config file found at {}",
            private_path(&config_path)
        );
    }

    if geo_path.exists() {
        let geo_content = format!(
            "#[Private geo coordinates]\nlatitude = {latitude:.6}\nlongitude = {longitude:.6}\n"
        );
        fs::write(&geo_path, geo_content)
            .with_context(|| format!("Failed to write coordinates to {}", private_path(&geo_path)))?;

        log_block_start!("Updated geo coordinates in {}", private_path(&geo_path));
        log_indented!("Latitude: {latitude:.6}");
        log_indented!("Longitude: {longitude:.6}");
        return Ok(());
    }

    let content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config from {}", private_path(&config_path)))?;
    let updated_content = replace_coordinates(&content, latitude, longitude);

    fs::write(&config_path, updated_content).with_context(|| {
        format!(
            "Failed to write updated config to {}",
            private_path(&config_path)
        )
    })?;

    log_block_start!("Updated config file: {}", private_path(&config_path));
    log_indented!("Latitude: {latitude:.6}");
    log_indented!("Longitude: {longitude:.6}");

    Ok(())
}

/// Rewrite or append the coordinate lines of a config file's content.
pub(crate) fn replace_coordinates(content: &str, latitude: f64, longitude: f64) -> String {
    let lat_value = format!("{latitude:.6}");
    let lon_value = format!("{longitude:.6}");

    let lat_line = find_config_line(content, "latitude");
    let lon_line = find_config_line(content, "longitude");

    let target_column = match (&lat_line, &lon_line) {
        (Some(lat), Some(lon)) => {
            let lat_pos = lat.find('#').unwrap_or(lat.len());
            let lon_pos = lon.find('#').unwrap_or(lon.len());
            lat_pos.max(lon_pos)
        }
        (Some(line), None) | (None, Some(line)) => line.find('#').unwrap_or(DEFAULT_COMMENT_COLUMN),
        (None, None) => DEFAULT_COMMENT_COLUMN,
    };

    let mut updated_content = content.to_string();
    if let Some(line) = &lat_line {
        let new_line = align_comment_to_column(line, "latitude", &lat_value, target_column);
        updated_content = updated_content.replace(line, &new_line);
    }
    if let Some(line) = &lon_line {
        let new_line = align_comment_to_column(line, "longitude", &lon_value, target_column);
        updated_content = updated_content.replace(line, &new_line);
    }

    if lat_line.is_none() || lon_line.is_none() {
        if !updated_content.ends_with('\n') {
            updated_content.push('\n');
        }
        if lat_line.is_none() {
            updated_content.push_str(&format!("latitude = {lat_value}\n"));
        }
        if lon_line.is_none() {
            updated_content.push_str(&format!("longitude = {lon_value}\n"));
        }
    }

    updated_content
}

/// Column comments are aligned to when no existing line gives one.
const DEFAULT_COMMENT_COLUMN: usize = 28;

/// Find an active (uncommented) config line assigning `key`.
pub(crate) fn find_config_line(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .find(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with('#')
                && trimmed
                    .split_once('=')
                    .is_some_and(|(name, _)| name.trim() == key)
        })
        .map(str::to_string)
}

/// Replace the value of a config line, keeping its comment at `target_column`.
fn align_comment_to_column(
    original_line: &str,
    key: &str,
    new_value: &str,
    target_column: usize,
) -> String {
    let key_value_part = format!("{key} = {new_value}");

    if let Some(comment_pos) = original_line.find('#') {
        let comment_part = &original_line[comment_pos..];
        let padding_needed = if key_value_part.len() < target_column {
            target_column - key_value_part.len()
        } else {
            1
        };
        format!(
            "{}{}{}",
            key_value_part,
            " ".repeat(padding_needed),
            comment_part
        )
    } else {
        key_value_part
    }
}

/// Builder for dynamically aligned configuration files.
///
/// Comments of all settings start in the same column, one space past the
/// longest `key = value` part.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
    Comment(String),
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A commented-out line, emitted verbatim behind `# `.
    fn add_comment(mut self, text: &str) -> Self {
        self.entries.push(ConfigEntry::Comment(format!("# {text}")));
        self
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{line}{padding}{comment}"));
                }
                ConfigEntry::Comment(text) => result.push(text),
            }
        }

        let mut content = result.join("\n");
        content.push('\n');
        content
    }
}
