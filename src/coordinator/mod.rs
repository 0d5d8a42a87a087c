//! Intersection coordinator
//!
//! The coordinator consumes four inbound signals and drives a timed
//! parameter override for each intersection traversal:
//! - **Turn classification:** first value wins per crossing, debug override trumps
//! - **FSM state:** entering coordination arms a fresh classification
//! - **Go command:** starts the override/dwell sequence on a worker task
//! - **Pose update:** relayed outward only during the active dwell window

mod config;
mod core;
mod handle;
mod messages;
mod traversal;

pub use config::CoordinatorConfig;
pub use core::Coordinator;
pub use handle::CoordinatorHandle;
pub use messages::{CoordinatorMetrics, CoordinatorStatus, OutboundEvent, Request, TraversalOutcome};
