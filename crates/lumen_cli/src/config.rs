//! Application settings, optionally loaded from a JSON file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lumen_renderer::RenderConfig;
use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "LUMEN_CONFIG";

/// Everything the binary needs besides the scene itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_width: u32,
    pub aspect_ratio: f32,
    /// Write 32-bit BGRA instead of 24-bit BGR
    pub has_alpha: bool,
    pub output: PathBuf,
    pub render: RenderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            image_width: 400,
            aspect_ratio: 3.0 / 2.0,
            has_alpha: true,
            output: PathBuf::from("main.bmp"),
            render: RenderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Image height derived from the width and aspect ratio, at least 1.
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f32 / self.aspect_ratio) as u32).max(1)
    }

    /// Parse settings from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid render settings")
    }

    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Settings from `LUMEN_CONFIG` if set, defaults otherwise.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                let path = PathBuf::from(path);
                log::info!("Loading settings from {}", path.display());
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }
}
