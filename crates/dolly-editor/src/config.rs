//! Layered configuration
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variable: `DOLLY_LOG` (log filter)
//! 2. Project-local: `.dolly/config.toml`
//! 3. Global: `~/.dolly/config.toml`
//!
//! Files are merged table by table, so a project file only needs the keys
//! it overrides.

use dolly_core::{DollyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Window and viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    /// Segments used to draw the path polyline
    pub overlay_samples: usize,
    /// Drag speed of the position / target / up editors
    pub drag_speed: f32,
    pub orbit_sensitivity: f32,
    pub pan_sensitivity: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1600,
            window_height: 900,
            overlay_samples: 128,
            drag_speed: 0.05,
            orbit_sensitivity: 0.01,
            pan_sensitivity: 0.02,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub speed: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self { speed: 1.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `info` or `dolly_editor=debug`
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DollyConfig {
    pub viewer: ViewerConfig,
    pub playback: PlaybackConfig,
    pub log: LogConfig,
}

impl DollyConfig {
    /// Load config with layered precedence: global < project < env vars
    pub fn load() -> Result<Self> {
        let mut merged = toml::Table::new();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_tables(&mut merged, Self::load_table(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".dolly/config.toml");
        if local_path.exists() {
            merge_tables(&mut merged, Self::load_table(&local_path)?);
        }

        let mut config = Self::from_table(merged)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load config from a specific file path only
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let mut config = Self::from_table(Self::load_table(path)?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".dolly").join("config.toml"))
    }

    fn load_table(path: &Path) -> Result<toml::Table> {
        let content = std::fs::read_to_string(path)?;
        content.parse::<toml::Table>().map_err(|e| {
            DollyError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })
    }

    fn from_table(table: toml::Table) -> Result<Self> {
        toml::Value::Table(table)
            .try_into()
            .map_err(|e| DollyError::ConfigError(format!("Invalid config: {}", e)))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("DOLLY_LOG") {
            if !level.trim().is_empty() {
                self.log.level = level;
            }
        }
    }
}

/// Recursively overlay `overlay` onto `base`.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
