//! Scenario configuration and runtime tunables.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid world dimensions {width}x{height}; both must be positive")]
    InvalidDimensions { width: usize, height: usize },
}

/// The three live tunables, each on a 0..=10 scale as in the original
/// control panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Higher values shorten the grass regrowth delay.
    #[serde(default = "default_grass_growth_rate")]
    pub grass_growth_rate: f32,
    /// Zero freezes the cloud field entirely.
    #[serde(default = "default_cloud_speed")]
    pub cloud_speed: f32,
    /// Scales the initial cloud cover; changing it re-rolls the deck.
    #[serde(default = "default_cloud_density")]
    pub cloud_density: f32,
}

pub const PARAM_MIN: f32 = 0.0;
pub const PARAM_MAX: f32 = 10.0;

fn default_grass_growth_rate() -> f32 {
    5.0
}

fn default_cloud_speed() -> f32 {
    3.0
}

fn default_cloud_density() -> f32 {
    5.0
}

impl Default for Params {
    fn default() -> Self {
        Self {
            grass_growth_rate: default_grass_growth_rate(),
            cloud_speed: default_cloud_speed(),
            cloud_density: default_cloud_density(),
        }
    }
}

fn default_initial_agents() -> usize {
    3
}

fn default_snapshot_interval_ticks() -> u64 {
    0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub seed: u64,
    pub width: usize,
    pub height: usize,
    #[serde(default = "default_initial_agents")]
    pub initial_agents: usize,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
}

impl Scenario {
    /// The built-in default scenario: a small meadow with a handful
    /// of grazers.
    pub fn meadow() -> Self {
        Self {
            name: "meadow".to_string(),
            seed: 7,
            width: 40,
            height: 30,
            initial_agents: 3,
            params: Params::default(),
            ticks: None,
            snapshot_interval_ticks: 0,
        }
    }

    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let scenario: Scenario = serde_yaml::from_str(&data)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn meadow_defaults() {
        let scenario = Scenario::meadow();
        assert_eq!(scenario.name, "meadow");
        assert_eq!(scenario.seed, 7);
        assert_eq!((scenario.width, scenario.height), (40, 30));
        assert_eq!(scenario.initial_agents, 3);
        assert_eq!(scenario.params.grass_growth_rate, 5.0);
        assert_eq!(scenario.params.cloud_speed, 3.0);
        assert_eq!(scenario.params.cloud_density, 5.0);
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn yaml_round_trip() {
        let scenario = Scenario::meadow();
        let path = env::temp_dir().join("verdure_test_scenario.yaml");
        scenario.to_yaml(&path).unwrap();
        let loaded = Scenario::from_yaml(&path).unwrap();
        assert_eq!(loaded.name, scenario.name);
        assert_eq!(loaded.seed, scenario.seed);
        assert_eq!(loaded.params, scenario.params);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let scenario: Scenario =
            serde_yaml::from_str("name: tiny\nseed: 3\nwidth: 8\nheight: 8\n").unwrap();
        assert_eq!(scenario.initial_agents, 3);
        assert_eq!(scenario.params, Params::default());
        assert_eq!(scenario.ticks, None);
        assert_eq!(scenario.ticks(Some(12)), 12);
        assert_eq!(scenario.ticks(None), 500);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let mut scenario = Scenario::meadow();
        scenario.width = 0;
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }
}
