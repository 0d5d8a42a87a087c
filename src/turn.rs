//! Turn classification and per-turn control profiles

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Classification of the upcoming maneuver at an intersection
///
/// On the wire this is an integer: -1 unknown, 0 left, 1 straight, 2 right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnType {
    #[default]
    Unknown,
    Left,
    Straight,
    Right,
}

impl TurnType {
    /// Decode the wire encoding; out-of-range values map to Unknown
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            -1 => TurnType::Unknown,
            0 => TurnType::Left,
            1 => TurnType::Straight,
            2 => TurnType::Right,
            other => {
                warn!(value = other, "Unrecognized turn classification value");
                TurnType::Unknown
            }
        }
    }

    /// Encode back to the wire integer
    pub fn as_raw(&self) -> i32 {
        match self {
            TurnType::Unknown => -1,
            TurnType::Left => 0,
            TurnType::Straight => 1,
            TurnType::Right => 2,
        }
    }

    /// Whether a classification has been received for this crossing
    pub fn is_known(&self) -> bool {
        !matches!(self, TurnType::Unknown)
    }
}

/// Control overrides applied for the duration of one turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnProfile {
    /// How long the override stays active, approximating the maneuver time
    #[serde(rename = "dwell-secs")]
    pub dwell_secs: f64,

    /// Angular-velocity bias applied while lane feedback is unavailable
    #[serde(rename = "feed-forward-omega")]
    pub feed_forward_omega: f64,

    /// Opaque tuning payload forwarded verbatim to the lane estimator
    #[serde(rename = "lane-filter-params")]
    pub lane_filter_params: Value,
}

impl Default for TurnProfile {
    fn default() -> Self {
        Self {
            dwell_secs: 2.0,
            feed_forward_omega: 0.0,
            lane_filter_params: Value::from(0),
        }
    }
}

/// The three turn profiles plus the debug override, refreshed as one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTable {
    pub left: TurnProfile,
    pub straight: TurnProfile,
    pub right: TurnProfile,

    /// When set, overrides every incoming classification
    #[serde(rename = "debug-turn")]
    pub debug_turn: Option<TurnType>,
}

impl Default for ProfileTable {
    fn default() -> Self {
        Self {
            left: TurnProfile {
                feed_forward_omega: 1.5,
                ..TurnProfile::default()
            },
            straight: TurnProfile::default(),
            right: TurnProfile {
                feed_forward_omega: -1.0,
                ..TurnProfile::default()
            },
            debug_turn: None,
        }
    }
}

impl ProfileTable {
    /// Look up the profile for a classified turn; Unknown has none
    pub fn profile_for(&self, turn: TurnType) -> Option<&TurnProfile> {
        match turn {
            TurnType::Left => Some(&self.left),
            TurnType::Straight => Some(&self.straight),
            TurnType::Right => Some(&self.right),
            TurnType::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_mapping() {
        assert_eq!(TurnType::from_raw(-1), TurnType::Unknown);
        assert_eq!(TurnType::from_raw(0), TurnType::Left);
        assert_eq!(TurnType::from_raw(1), TurnType::Straight);
        assert_eq!(TurnType::from_raw(2), TurnType::Right);
    }

    #[test]
    fn test_from_raw_out_of_range_is_unknown() {
        assert_eq!(TurnType::from_raw(3), TurnType::Unknown);
        assert_eq!(TurnType::from_raw(-7), TurnType::Unknown);
    }

    #[test]
    fn test_raw_round_trip() {
        for turn in [TurnType::Unknown, TurnType::Left, TurnType::Straight, TurnType::Right] {
            assert_eq!(TurnType::from_raw(turn.as_raw()), turn);
        }
    }

    #[test]
    fn test_default_profiles() {
        let table = ProfileTable::default();

        assert_eq!(table.left.dwell_secs, 2.0);
        assert_eq!(table.left.feed_forward_omega, 1.5);
        assert_eq!(table.straight.feed_forward_omega, 0.0);
        assert_eq!(table.right.feed_forward_omega, -1.0);
        assert!(table.debug_turn.is_none());
    }

    #[test]
    fn test_profile_for_unknown_is_none() {
        let table = ProfileTable::default();
        assert!(table.profile_for(TurnType::Unknown).is_none());
        assert!(table.profile_for(TurnType::Right).is_some());
    }

    #[test]
    fn test_deserialize_partial_table() {
        let yaml = r#"
left:
  dwell-secs: 3.5
  lane-filter-params: { matrix-mean: 0.1 }
debug-turn: right
"#;

        let table: ProfileTable = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(table.left.dwell_secs, 3.5);
        assert_eq!(table.left.lane_filter_params["matrix-mean"], 0.1);
        // Field-level defaults fill the rest of a partial profile
        assert_eq!(table.left.feed_forward_omega, 0.0);
        assert_eq!(table.straight.dwell_secs, 2.0);
        assert_eq!(table.debug_turn, Some(TurnType::Right));
    }
}
