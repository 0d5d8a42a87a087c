//! junctiond - intersection traversal coordinator
//!
//! junctiond coordinates a vehicle's behavior while it crosses a road
//! intersection. It reacts to an external "go" signal by selecting turn
//! parameters from a previously received classification, publishes a
//! lane-filter override request, applies a feed-forward angular-velocity
//! bias, relays pose updates for a turn-specific dwell window, then signals
//! completion and restores default control.
//!
//! # Modules
//!
//! - [`coordinator`] - signal handling and the timed-override worker
//! - [`params`] - parameter store interface and periodic profile refresh
//! - [`turn`] - turn classification and per-turn profiles
//! - [`config`] - configuration types and loading
//! - [`io`] - stdio JSON-line transport
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod coordinator;
pub mod io;
pub mod params;
pub mod turn;

// Re-export commonly used types
pub use config::{Config, ParamsConfig};
pub use coordinator::{
    Coordinator, CoordinatorConfig, CoordinatorHandle, CoordinatorMetrics, CoordinatorStatus, OutboundEvent, Request,
    TraversalOutcome,
};
pub use io::{Envelope, InboundSignal};
pub use params::{FileParameterStore, MemoryParameterStore, ParameterStore, ProfileRefresher, StoreError};
pub use turn::{ProfileTable, TurnProfile, TurnType};
