//! Traversal worker - the timed parameter override sequence
//!
//! One worker is spawned per go signal so the coordinator task keeps serving
//! FSM and pose signals during the dwell. Workers serialize on a mutex
//! guard; a second go signal queues behind the active traversal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tokio::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::params::ParameterStore;
use crate::turn::{ProfileTable, TurnType};

use super::config::CoordinatorConfig;
use super::messages::{OutboundEvent, TraversalOutcome};

/// Everything a traversal worker needs, cloned out of the coordinator
pub(crate) struct TraversalContext {
    pub id: Uuid,
    pub config: CoordinatorConfig,
    pub profiles: Arc<RwLock<ProfileTable>>,
    pub store: Arc<dyn ParameterStore>,
    pub outbound_tx: mpsc::Sender<OutboundEvent>,
    pub turn_rx: watch::Receiver<TurnType>,
    pub forwarding: Arc<AtomicBool>,
    pub cancel_rx: watch::Receiver<bool>,
    pub gate: Arc<Mutex<()>>,
}

/// Run the override sequence for one go signal
///
/// Sequence: wait for a classification, publish the lane-filter override,
/// set the feed-forward bias, settle, forward poses for the dwell window,
/// then restore default control and publish completion exactly once.
pub(crate) async fn run(ctx: TraversalContext) -> TraversalOutcome {
    let TraversalContext {
        id,
        config,
        profiles,
        store,
        outbound_tx,
        mut turn_rx,
        forwarding,
        mut cancel_rx,
        gate,
    } = ctx;

    // Serialize concurrent go signals
    let _guard = gate.lock().await;

    let turn = match wait_for_classification(id, &config, &mut turn_rx, &mut cancel_rx).await {
        Ok(turn) => turn,
        Err(outcome) => return outcome,
    };

    let profile = match profiles.read().await.profile_for(turn) {
        Some(profile) => profile.clone(),
        None => {
            error!(traversal = %id, ?turn, "No profile for classified turn");
            return TraversalOutcome::Abandoned;
        }
    };

    // Ask the lane filter to hold the override slightly past the dwell
    let event = OutboundEvent::LaneFilterOverride {
        params: profile.lane_filter_params.clone(),
        reset_secs: profile.dwell_secs + 1.0,
    };
    if outbound_tx.send(event).await.is_err() {
        warn!(traversal = %id, "Outbound channel closed, abandoning traversal");
        return TraversalOutcome::Abandoned;
    }

    if let Err(e) = store.set_feed_forward(profile.feed_forward_omega).await {
        warn!(traversal = %id, error = %e, "Failed to set feed-forward parameter");
    }

    // Wait for the lane filter to adapt to the new params
    if cancelled_during(&mut cancel_rx, config.settle()).await {
        info!(traversal = %id, "Traversal cancelled during settle");
        reset_feed_forward(id, store.as_ref()).await;
        return TraversalOutcome::Cancelled;
    }

    info!(
        traversal = %id,
        ?turn,
        dwell_secs = profile.dwell_secs,
        "Starting intersection control"
    );
    forwarding.store(true, Ordering::SeqCst);

    let cancelled = cancelled_during(&mut cancel_rx, Duration::from_secs_f64(profile.dwell_secs)).await;

    forwarding.store(false, Ordering::SeqCst);
    reset_feed_forward(id, store.as_ref()).await;

    if cancelled {
        info!(traversal = %id, "Traversal cancelled mid-dwell");
        return TraversalOutcome::Cancelled;
    }

    if outbound_tx.send(OutboundEvent::Done { data: true }).await.is_err() {
        warn!(traversal = %id, "Outbound channel closed before completion signal");
        return TraversalOutcome::Abandoned;
    }

    info!(traversal = %id, "Intersection traversal complete");
    TraversalOutcome::Completed
}

/// Wait until the classifier resolves, logging on the poll interval
///
/// Honors the optional classifier bound so a never-resolving wait is
/// reported as abandoned instead of hanging forever.
async fn wait_for_classification(
    id: Uuid,
    config: &CoordinatorConfig,
    turn_rx: &mut watch::Receiver<TurnType>,
    cancel_rx: &mut watch::Receiver<bool>,
) -> Result<TurnType, TraversalOutcome> {
    let deadline = config.classifier_timeout().map(|bound| Instant::now() + bound);

    loop {
        let current = *turn_rx.borrow_and_update();
        if current.is_known() {
            return Ok(current);
        }

        let timed_out = async {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            changed = turn_rx.changed() => {
                if changed.is_err() {
                    warn!(traversal = %id, "Classification channel closed, abandoning traversal");
                    return Err(TraversalOutcome::Abandoned);
                }
            }
            _ = tokio::time::sleep(config.classifier_poll()) => {
                info!(
                    traversal = %id,
                    "Requested to start intersection, but no turn classification yet"
                );
            }
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                info!(traversal = %id, "Traversal cancelled while awaiting classification");
                return Err(TraversalOutcome::Cancelled);
            }
            _ = timed_out => {
                error!(
                    traversal = %id,
                    timeout_secs = config.classifier_timeout_secs,
                    "Classifier never resolved, abandoning traversal"
                );
                return Err(TraversalOutcome::Abandoned);
            }
        }
    }
}

/// Sleep for the given duration, returning true if cancelled first
async fn cancelled_during(cancel_rx: &mut watch::Receiver<bool>, duration: Duration) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(duration) => false,
        _ = cancel_rx.wait_for(|cancelled| *cancelled) => true,
    }
}

async fn reset_feed_forward(id: Uuid, store: &dyn ParameterStore) {
    if let Err(e) = store.set_feed_forward(0.0).await {
        warn!(traversal = %id, error = %e, "Failed to reset feed-forward parameter");
    }
}
