//! Message types for the coordinator

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

use crate::turn::TurnType;

/// Inbound signals and internal requests handled by the coordinator task
#[derive(Debug)]
pub enum Request {
    /// Turn classification from the external classifier (wire integer)
    TurnClassified { raw: i32 },

    /// FSM state change
    FsmState { state: String },

    /// Go command for the intersection traversal
    Go { data: bool },

    /// Pose update from the lane estimator
    Pose { pose: Value },

    /// Traversal worker finished (internal)
    TraversalFinished { outcome: TraversalOutcome },

    /// Get a snapshot of coordinator state and counters
    GetStatus {
        reply_tx: oneshot::Sender<CoordinatorStatus>,
    },

    /// Shutdown the coordinator, cancelling any in-flight traversal
    Shutdown,
}

/// How a traversal worker ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOutcome {
    /// Full override sequence ran and the completion signal was published
    Completed,
    /// The classifier never resolved within the configured bound
    Abandoned,
    /// Shutdown interrupted the sequence; control state was restored
    Cancelled,
}

/// Events published by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutboundEvent {
    /// Temporary lane-filter override request
    LaneFilterOverride {
        /// Opaque tuning payload, forwarded verbatim
        params: Value,
        /// How long the lane filter should hold the override before reverting
        #[serde(rename = "reset-secs")]
        reset_secs: f64,
    },

    /// Pose relayed unchanged during the dwell window
    Pose(Value),

    /// Intersection traversal finished
    Done { data: bool },
}

/// Snapshot of coordinator state for status queries
#[derive(Debug, Clone)]
pub struct CoordinatorStatus {
    pub fsm_state: String,
    pub turn_type: TurnType,
    pub forwarding_pose: bool,
    pub metrics: CoordinatorMetrics,
}

/// Coordinator counters for observability
#[derive(Debug, Clone, Default)]
pub struct CoordinatorMetrics {
    pub requests_received: u64,
    pub poses_forwarded: u64,
    pub poses_dropped: u64,
    pub traversals_started: u64,
    pub traversals_completed: u64,
    pub traversals_abandoned: u64,
    pub traversals_cancelled: u64,
}
