// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Parser;
use winit::keyboard::KeyCode;

use crate::config::ViewerConfig;

#[derive(Parser, Debug, Clone)]
#[command(name = "globe-view")]
#[command(about = "Globe viewer with a trackball camera", long_about = None)]
pub struct Cli {
    /// JSON settings file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Key that resets the camera, e.g. "Space" or "KeyH"
    #[arg(long = "home-key")]
    pub home_key: Option<String>,

    /// Pan in a flat plane instead of across the globe
    #[arg(long, default_value = "false")]
    pub flat: bool,

    /// Number of marker boxes to place around the home location
    #[arg(long)]
    pub boxes: Option<u32>,

    /// Log builder activity
    #[arg(long, default_value = "false")]
    pub verbose: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn resolve_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)?,
            None => ViewerConfig::default(),
        };

        if let Some(name) = &self.home_key {
            config.trackball.home_key = parse_key_code(name)?;
        }
        if let Some(boxes) = self.boxes {
            config.marker_count = boxes;
        }
        config.flat |= self.flat;

        Ok(config)
    }
}

/// Parse a winit key code by its variant name
pub fn parse_key_code(name: &str) -> Result<KeyCode> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| anyhow!("Unknown key code: {}", name))
}
