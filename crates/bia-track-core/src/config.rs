//! Tracker configuration: JSON file, then environment overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::Locale;
use crate::models::ReadingLimits;
use crate::report::ChartOptions;

pub const ENV_DB: &str = "BIA_TRACK_DB";
pub const ENV_WINDOW: &str = "BIA_TRACK_WINDOW";
pub const ENV_LOCALE: &str = "BIA_TRACK_LOCALE";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// SQLite file holding measurements and the profile
    pub database_path: PathBuf,
    /// Number of readings shown on the trend chart
    pub window_size: usize,
    pub limits: ReadingLimits,
    pub chart: ChartOptions,
    pub locale: Locale,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("bia_track.db"),
            window_size: 7,
            limits: ReadingLimits::default(),
            chart: ChartOptions::default(),
            locale: Locale::default(),
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), "config file loaded");
        Ok(config)
    }

    /// Defaults or `path`, then environment overrides, then validation.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        info!(
            database = %config.database_path.display(),
            window_size = config.window_size,
            locale = %config.locale,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Apply `BIA_TRACK_*` variables from the process environment.
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = get(ENV_DB) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(window) = get(ENV_WINDOW) {
            self.window_size = window.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a positive integer, got {:?}", ENV_WINDOW, window))
            })?;
        }
        if let Some(locale) = get(ENV_LOCALE) {
            self.locale = locale.parse().map_err(ConfigError::Invalid)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.window_size == 0 {
            return Err(ConfigError::Invalid("window_size must be at least 1".into()));
        }
        let limits = &self.limits;
        if !(limits.weight_min_kg > 0.0 && limits.weight_min_kg < limits.weight_max_kg) {
            return Err(ConfigError::Invalid(format!(
                "weight limits {}..{} are not a positive range",
                limits.weight_min_kg, limits.weight_max_kg
            )));
        }
        if !(limits.impedance_min_ohm > 0 && limits.impedance_min_ohm < limits.impedance_max_ohm) {
            return Err(ConfigError::Invalid(format!(
                "impedance limits {}..{} are not a positive range",
                limits.impedance_min_ohm, limits.impedance_max_ohm
            )));
        }
        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(ConfigError::Invalid("chart size must be non-zero".into()));
        }
        Ok(())
    }
}
