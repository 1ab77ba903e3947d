//! Configuration module
//!
//! Reads the lot layout, fee schedule and logging settings from a TOML file
//! (~/.config/parking-lot/config.toml by default).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::application::Lot;
use crate::domain::{FeeSchedule, SizeClass, SlotRegistry};
use crate::support::errors::ConfigError;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub lot: LotConfig,
    pub tariff: FeeSchedule,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Output format: "text" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Physical layout of the lot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    pub entry_points: usize,
    pub slots: Vec<SlotConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotConfig {
    pub class: SizeClass,
    /// Distance from each entry point
    pub distances: Vec<u32>,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            entry_points: 3,
            slots: vec![
                SlotConfig {
                    class: SizeClass::Small,
                    distances: vec![1, 4, 5],
                },
                SlotConfig {
                    class: SizeClass::Large,
                    distances: vec![3, 2, 3],
                },
                SlotConfig {
                    class: SizeClass::Medium,
                    distances: vec![2, 1, 4],
                },
            ],
        }
    }
}

impl LotConfig {
    pub fn build_registry(&self) -> Result<SlotRegistry, ConfigError> {
        let distances = self.slots.iter().map(|s| s.distances.clone()).collect();
        let classes = self.slots.iter().map(|s| s.class).collect();
        Ok(SlotRegistry::new(self.entry_points, distances, classes)?)
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the layout and construct the lot
    pub fn build_lot(&self) -> Result<Lot, ConfigError> {
        let registry = self.lot.build_registry()?;
        Ok(Lot::from_registry(registry, self.tariff.clone())?)
    }
}

/// Default config location, `PARKING_CONFIG` overrides it
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("PARKING_CONFIG") {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parking-lot")
        .join("config.toml")
}
