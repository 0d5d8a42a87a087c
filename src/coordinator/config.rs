//! Coordinator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// FSM state that arms the coordinator for a fresh classification
    #[serde(default = "default_coordination_state", rename = "coordination-state")]
    pub coordination_state: String,

    /// Delay after publishing the override before pose forwarding starts, seconds
    #[serde(default = "default_settle_secs", rename = "settle-secs")]
    pub settle_secs: f64,

    /// Interval between "waiting for classification" log lines, seconds
    #[serde(default = "default_classifier_poll_secs", rename = "classifier-poll-secs")]
    pub classifier_poll_secs: f64,

    /// Give up waiting for a classification after this long (unset = wait forever)
    #[serde(default, rename = "classifier-timeout-secs")]
    pub classifier_timeout_secs: Option<f64>,

    /// Channel buffer size for coordinator requests
    #[serde(default = "default_channel_buffer", rename = "channel-buffer")]
    pub channel_buffer: usize,

    /// Channel buffer size for outbound events
    #[serde(default = "default_outbound_buffer", rename = "outbound-buffer")]
    pub outbound_buffer: usize,
}

fn default_coordination_state() -> String {
    "INTERSECTION_COORDINATION".to_string()
}

fn default_settle_secs() -> f64 {
    1.0
}

fn default_classifier_poll_secs() -> f64 {
    2.0
}

fn default_channel_buffer() -> usize {
    64
}

fn default_outbound_buffer() -> usize {
    64
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            coordination_state: default_coordination_state(),
            settle_secs: 1.0,
            classifier_poll_secs: 2.0,
            classifier_timeout_secs: None,
            channel_buffer: 64,
            outbound_buffer: 64,
        }
    }
}

impl CoordinatorConfig {
    /// Get the settle delay as a Duration
    pub fn settle(&self) -> Duration {
        Duration::from_secs_f64(self.settle_secs)
    }

    /// Get the classifier poll interval as a Duration
    pub fn classifier_poll(&self) -> Duration {
        Duration::from_secs_f64(self.classifier_poll_secs)
    }

    /// Get the classifier wait bound as a Duration, if configured
    pub fn classifier_timeout(&self) -> Option<Duration> {
        self.classifier_timeout_secs.map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.coordination_state, "INTERSECTION_COORDINATION");
        assert_eq!(config.settle_secs, 1.0);
        assert_eq!(config.classifier_poll_secs, 2.0);
        assert!(config.classifier_timeout_secs.is_none());
        assert_eq!(config.channel_buffer, 64);
        assert_eq!(config.outbound_buffer, 64);
    }

    #[test]
    fn test_durations() {
        let config = CoordinatorConfig {
            settle_secs: 0.5,
            classifier_timeout_secs: Some(10.0),
            ..Default::default()
        };
        assert_eq!(config.settle(), Duration::from_millis(500));
        assert_eq!(config.classifier_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_deserialize_partial() {
        let yaml = r#"
settle-secs: 0.25
classifier-timeout-secs: 30.0
"#;
        let config: CoordinatorConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.settle_secs, 0.25);
        assert_eq!(config.classifier_timeout_secs, Some(30.0));
        assert_eq!(config.coordination_state, "INTERSECTION_COORDINATION");
    }
}
