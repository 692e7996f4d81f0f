//! Viewer settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shared::paths::DEFAULT_MODEL;

use crate::context::DAMPING_FACTOR;

/// Startup settings; read once, never written back by the viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Model name under `models/`
    pub model: String,
    /// Directory holding `models/` (native only)
    pub asset_root: PathBuf,
    /// Fetch assets over HTTP from this base URL instead of `asset_root`
    pub base_url: Option<String>,
    /// Initial window size in logical pixels
    pub window_size: [f32; 2],
    /// Orbit damping factor
    pub damping_factor: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            asset_root: PathBuf::from("."),
            base_url: None,
            window_size: [1280.0, 800.0],
            damping_factor: DAMPING_FACTOR,
        }
    }
}

impl ViewerSettings {
    /// Load settings from the platform config directory, or return defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        if let Some(dirs) = directories::ProjectDirs::from("com", "modelviewer", "model-viewer") {
            let config_path = dirs.config_dir().join("settings.json");
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Self::default()
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }

    /// Read a settings file; a missing or malformed file yields defaults
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    tracing::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings {}: {e}", path.display());
                    Self::default()
                }
            },
            Err(e) => {
                tracing::debug!("No settings at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Command-line flags win over the settings file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn apply_cli(&mut self, cli: CliArgs) {
        if let Some(model) = cli.model {
            self.model = model;
        }
        if let Some(assets) = cli.assets {
            self.asset_root = assets;
        }
        if cli.url.is_some() {
            self.base_url = cli.url;
        }
    }
}

/// View a glTF model with its parameter form
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, clap::Parser)]
#[command(name = "model-viewer", version, about)]
pub struct CliArgs {
    /// Model name under `models/`
    #[arg(long)]
    pub model: Option<String>,

    /// Directory holding `models/`
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Fetch assets over HTTP from this base URL
    #[arg(long)]
    pub url: Option<String>,
}
