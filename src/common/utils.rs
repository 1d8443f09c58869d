//! Small shared helpers.

use std::path::Path;

/// Render a path for log output with the home directory collapsed to `~`.
pub fn private_path(path: &Path) -> String {
    if let Some(home) = dirs::home_dir()
        && let Ok(rest) = path.strip_prefix(&home)
    {
        return format!("~/{}", rest.display());
    }
    path.display().to_string()
}

/// Wrap any angle in degrees into `[0, 360)`.
///
/// Uses `((deg % 360) + 360) % 360` so negative inputs land on the matching
/// positive angle. The final clamp guards against `-0.0` and the rounding case
/// where a tiny negative remainder produces exactly `360.0`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = ((degrees % 360.0) + 360.0) % 360.0;
    if wrapped >= 360.0 || wrapped == 0.0 {
        0.0
    } else {
        wrapped
    }
}
