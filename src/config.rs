//! junctiond configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::coordinator::CoordinatorConfig;
use crate::turn::ProfileTable;

/// Main junctiond configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Coordinator timings and buffers
    pub coordinator: CoordinatorConfig,

    /// Turn profiles served until the first refresh
    pub profiles: ProfileTable,

    /// Parameter store paths and refresh period
    pub params: ParamsConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: .junctiond.yml
        let local_config = PathBuf::from(".junctiond.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/junctiond/junctiond.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("junctiond").join("junctiond.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Parameter store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsConfig {
    /// YAML file the refresher re-reads for live profile updates
    #[serde(rename = "profiles-path")]
    pub profiles_path: PathBuf,

    /// JSON control file receiving feed-forward writes
    #[serde(rename = "feed-forward-path")]
    pub feed_forward_path: PathBuf,

    /// Refresh period in seconds
    #[serde(rename = "refresh-interval-secs")]
    pub refresh_interval_secs: f64,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            profiles_path: PathBuf::from("junctiond-params.yml"),
            feed_forward_path: PathBuf::from("junctiond-omega-ff.json"),
            refresh_interval_secs: 1.0,
        }
    }
}

impl ParamsConfig {
    /// Get the refresh period as a Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs_f64(self.refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::TurnType;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.coordinator.coordination_state, "INTERSECTION_COORDINATION");
        assert_eq!(config.profiles.left.feed_forward_omega, 1.5);
        assert_eq!(config.params.refresh_interval_secs, 1.0);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
coordinator:
  settle-secs: 0.5
  classifier-timeout-secs: 20.0

profiles:
  right:
    dwell-secs: 2.8
    feed-forward-omega: -1.2
    lane-filter-params:
      matrix-mean: 0.05
  debug-turn: right

params:
  profiles-path: /etc/junctiond/params.yml
  refresh-interval-secs: 2.0
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.coordinator.settle_secs, 0.5);
        assert_eq!(config.coordinator.classifier_timeout_secs, Some(20.0));
        assert_eq!(config.profiles.right.dwell_secs, 2.8);
        assert_eq!(config.profiles.right.lane_filter_params["matrix-mean"], 0.05);
        assert_eq!(config.profiles.debug_turn, Some(TurnType::Right));
        assert_eq!(config.params.profiles_path, PathBuf::from("/etc/junctiond/params.yml"));
        assert_eq!(config.params.refresh_interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
coordinator:
  settle-secs: 0.1
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.coordinator.settle_secs, 0.1);

        // Defaults for unspecified
        assert_eq!(config.coordinator.classifier_poll_secs, 2.0);
        assert_eq!(config.profiles.straight.dwell_secs, 2.0);
        assert_eq!(config.params.refresh_interval_secs, 1.0);
    }
}
