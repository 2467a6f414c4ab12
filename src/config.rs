use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use winit::keyboard::KeyCode;

/// Tuning knobs for the globe trackball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackballSettings {
    /// Key that resets the camera to its starting pose
    pub home_key: KeyCode,
    /// Lowest altitude the eye may reach above the ellipsoid
    pub minimum_altitude: f64,
    /// Fraction of the eye-center distance moved per unit of NDC pan
    pub pan_scale: f64,
    /// Zoom ratio applied per scroll line
    pub scroll_zoom_scale: f64,
    /// Zoom rate per unit of vertical NDC drag
    pub drag_zoom_scale: f64,
    /// Frame rate the pending motion deltas are expressed in
    pub frame_rate_normalization: f64,
}

impl Default for TrackballSettings {
    fn default() -> Self {
        Self {
            home_key: KeyCode::Space,
            minimum_altitude: 1.0,
            pan_scale: 0.3,
            scroll_zoom_scale: 0.1,
            drag_zoom_scale: 2.0,
            frame_rate_normalization: 60.0,
        }
    }
}

/// Demo viewer configuration, read from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub trackball: TrackballSettings,
    pub window_width: u32,
    pub window_height: u32,
    /// Starting eye position as latitude/longitude in degrees and altitude
    pub home_location: [f64; 3],
    /// Number of marker boxes scattered around the home location
    pub marker_count: u32,
    /// Upper bound on distinct textures the builder may allocate
    pub max_textures: u32,
    /// Disable the ellipsoid and pan in a flat plane
    pub flat: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            trackball: TrackballSettings::default(),
            window_width: 1280,
            window_height: 720,
            home_location: [51.5, -0.12, 20_000.0],
            marker_count: 16,
            max_textures: 64,
            flat: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse viewer config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize viewer config")
    }
}
