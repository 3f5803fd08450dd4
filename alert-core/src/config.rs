use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{model::Coordinate, rules::AlertRule};

/// The point the forecast is fetched for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

impl LocationConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::named(self.latitude, self.longitude, self.name.clone())
    }
}

/// Where triggered alerts are delivered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Native desktop notification via the OS notifier.
    #[serde(default = "default_true")]
    pub desktop: bool,
    /// Timestamped lines appended to the log file.
    #[serde(default = "default_true")]
    pub log: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { desktop: true, log: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_path")]
    pub path: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { path: default_log_path() }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> PathBuf {
    PathBuf::from("logs/weather-alert.log")
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [location]
/// latitude = 35.6762
/// longitude = 139.6503
/// name = "Tokyo, Japan"
///
/// [[rules]]
/// kind = "rain"
/// threshold = 50
/// lookahead_hours = 6
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub location: LocationConfig,

    /// Alert rules, evaluated in the order they appear here.
    #[serde(default)]
    pub rules: Vec<AlertRule>,

    #[serde(default)]
    pub notifications: NotificationsConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load config from the platform config directory.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Err(anyhow!(
                "Config file not found: {}\n\
                 Hint: run `weather-alert init` to create one.",
                path.display()
            ));
        }
        Self::load_from(&path)
    }

    /// Load config from an explicit path (`--config`, tests).
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-alert", "weather-alert")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Fail fast on bad config, before any network call is made.
    fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.location.latitude) {
            return Err(anyhow!(
                "latitude {} is out of range [-90, 90]",
                self.location.latitude
            ));
        }
        if !(-180.0..=180.0).contains(&self.location.longitude) {
            return Err(anyhow!(
                "longitude {} is out of range [-180, 180]",
                self.location.longitude
            ));
        }

        for (i, rule) in self.rules.iter().enumerate() {
            rule.validate().with_context(|| format!("invalid [[rules]] entry #{}", i + 1))?;
        }

        Ok(())
    }
}
