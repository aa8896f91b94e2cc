//! Configuration file support for hiit.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/hiit/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub features: FeatureConfig,
}

/// Where plans come from
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Plan endpoint URL or path to a JSON/CSV export
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Session timing and circuit bounds
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Short rest between sets and exercises; circuits rest twice as long
    #[serde(default = "default_rest_seconds")]
    pub rest_seconds: u32,

    #[serde(default = "default_min_circuits")]
    pub min_circuits: u32,

    #[serde(default = "default_max_circuits")]
    pub max_circuits: u32,

    #[serde(default = "default_circuits")]
    pub default_circuits: u32,

    #[serde(default = "default_phase")]
    pub default_phase: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_seconds: default_rest_seconds(),
            min_circuits: default_min_circuits(),
            max_circuits: default_max_circuits(),
            default_circuits: default_circuits(),
            default_phase: default_phase(),
        }
    }
}

impl SessionConfig {
    /// Rest between circuits
    pub fn long_rest_seconds(&self) -> u32 {
        self.rest_seconds.saturating_mul(2)
    }

    /// Check a circuit count against the configured bounds
    pub fn check_circuits(&self, value: u32) -> Result<u32> {
        if value < self.min_circuits.max(1) || value > self.max_circuits {
            return Err(Error::InvalidCircuits {
                value,
                min: self.min_circuits.max(1),
                max: self.max_circuits,
            });
        }
        Ok(value)
    }
}

/// Optional behaviours, one per historical variant of the app
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Group days under weekly phases
    #[serde(default = "default_true")]
    pub phases: bool,

    /// Insert rest periods between sets, exercises and circuits
    #[serde(default = "default_true")]
    pub rest: bool,

    /// Run a countdown for exercises whose details carry a duration
    #[serde(default = "default_true")]
    pub timed_exercises: bool,

    /// Allow posting edited days back to the endpoint
    #[serde(default)]
    pub editing: bool,

    /// Ring the terminal bell when a countdown ends and when the workout is done
    #[serde(default = "default_true")]
    pub sound: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            phases: true,
            rest: true,
            timed_exercises: true,
            editing: false,
            sound: true,
        }
    }
}

// Default value functions
fn default_timeout_seconds() -> u64 {
    30
}

fn default_rest_seconds() -> u32 {
    15
}

fn default_min_circuits() -> u32 {
    1
}

fn default_max_circuits() -> u32 {
    3
}

fn default_circuits() -> u32 {
    3
}

fn default_phase() -> String {
    "Week 1-2".into()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            other => {
                tracing::info!("No config file found at {:?}, using defaults", other);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("hiit").join("config.toml"))
    }

    /// Reject settings the session cannot work with
    pub fn validate(&self) -> Result<()> {
        let s = &self.session;
        if s.max_circuits == 0 {
            return Err(Error::Config("session.max_circuits must be at least 1".into()));
        }
        if s.min_circuits > s.max_circuits {
            return Err(Error::Config(format!(
                "session.min_circuits ({}) exceeds session.max_circuits ({})",
                s.min_circuits, s.max_circuits
            )));
        }
        s.check_circuits(s.default_circuits).map_err(|_| {
            Error::Config(format!(
                "session.default_circuits ({}) is outside {}-{}",
                s.default_circuits, s.min_circuits, s.max_circuits
            ))
        })?;
        if self.source.timeout_seconds == 0 {
            return Err(Error::Config("source.timeout_seconds must be positive".into()));
        }
        Ok(())
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()
            .ok_or_else(|| Error::Config("No config directory available".into()))?;
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
