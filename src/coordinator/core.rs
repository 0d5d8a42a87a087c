//! Main coordinator task implementation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, RwLock, mpsc, watch};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::params::ParameterStore;
use crate::turn::{ProfileTable, TurnType};

use super::config::CoordinatorConfig;
use super::handle::CoordinatorHandle;
use super::messages::{CoordinatorMetrics, CoordinatorStatus, OutboundEvent, Request, TraversalOutcome};
use super::traversal::{self, TraversalContext};

/// The coordinator reacts to intersection signals and drives a timed
/// parameter override for each traversal
pub struct Coordinator {
    config: CoordinatorConfig,
    profiles: Arc<RwLock<ProfileTable>>,
    store: Arc<dyn ParameterStore>,
    tx: mpsc::Sender<Request>,
    rx: mpsc::Receiver<Request>,
    outbound_tx: mpsc::Sender<OutboundEvent>,
}

impl Coordinator {
    /// Create a new coordinator; returns it with the outbound event receiver
    pub fn new(
        config: CoordinatorConfig,
        profiles: Arc<RwLock<ProfileTable>>,
        store: Arc<dyn ParameterStore>,
    ) -> (Self, mpsc::Receiver<OutboundEvent>) {
        let (tx, rx) = mpsc::channel(config.channel_buffer);
        let (outbound_tx, outbound_rx) = mpsc::channel(config.outbound_buffer);

        (
            Self {
                config,
                profiles,
                store,
                tx,
                rx,
                outbound_tx,
            },
            outbound_rx,
        )
    }

    /// Create a handle for injecting signals
    pub fn handle(&self) -> CoordinatorHandle {
        CoordinatorHandle::new(self.tx.clone())
    }

    /// Run the coordinator task
    ///
    /// This consumes the coordinator and runs until shutdown is requested.
    /// Go signals spawn a traversal worker so the loop keeps serving FSM and
    /// pose signals during the dwell.
    pub async fn run(mut self) {
        let coord_tx = self.tx.clone();

        // Single-writer shared state: this task owns the classification,
        // the traversal worker owns the forwarding flag. The flag is read
        // fresh for every pose update.
        let (turn_tx, _turn_rx) = watch::channel(TurnType::Unknown);
        let forwarding = Arc::new(AtomicBool::new(false));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let gate = Arc::new(Mutex::new(()));

        let mut fsm_state = String::from("JOYSTICK_CONTROL");
        let mut metrics = CoordinatorMetrics::default();

        info!("Coordinator started");

        while let Some(req) = self.rx.recv().await {
            metrics.requests_received += 1;

            match req {
                Request::TurnClassified { raw } => {
                    let signalled = TurnType::from_raw(raw);
                    let debug_turn = self.profiles.read().await.debug_turn;
                    let current = *turn_tx.borrow();

                    // First classification wins per crossing; the debug
                    // override always wins
                    let next = match debug_turn {
                        Some(turn) => turn,
                        None if !current.is_known() => signalled,
                        None => current,
                    };

                    if next != current {
                        debug!(?next, "Turn classification set");
                        turn_tx.send_replace(next);
                    }
                }

                Request::FsmState { state } => {
                    if fsm_state != state && state == self.config.coordination_state {
                        debug!("Entering intersection coordination, awaiting fresh classification");
                        turn_tx.send_replace(TurnType::Unknown);
                    }
                    fsm_state = state;
                }

                Request::Pose { pose } => {
                    if forwarding.load(Ordering::SeqCst) {
                        if self.outbound_tx.send(OutboundEvent::Pose(pose)).await.is_ok() {
                            metrics.poses_forwarded += 1;
                        }
                    } else {
                        metrics.poses_dropped += 1;
                    }
                }

                Request::Go { data } => {
                    if !data {
                        debug!("Ignoring falsy go signal");
                        continue;
                    }

                    metrics.traversals_started += 1;

                    let ctx = TraversalContext {
                        id: Uuid::now_v7(),
                        config: self.config.clone(),
                        profiles: self.profiles.clone(),
                        store: self.store.clone(),
                        outbound_tx: self.outbound_tx.clone(),
                        turn_rx: turn_tx.subscribe(),
                        forwarding: forwarding.clone(),
                        cancel_rx: cancel_rx.clone(),
                        gate: gate.clone(),
                    };

                    debug!(traversal = %ctx.id, "Spawning traversal worker");
                    let finished_tx = coord_tx.clone();
                    tokio::spawn(async move {
                        let outcome = traversal::run(ctx).await;
                        let _ = finished_tx.send(Request::TraversalFinished { outcome }).await;
                    });
                }

                Request::TraversalFinished { outcome } => {
                    debug!(?outcome, "Traversal worker finished");
                    match outcome {
                        TraversalOutcome::Completed => metrics.traversals_completed += 1,
                        TraversalOutcome::Abandoned => {
                            warn!("Traversal abandoned without completion signal");
                            metrics.traversals_abandoned += 1;
                        }
                        TraversalOutcome::Cancelled => metrics.traversals_cancelled += 1,
                    }
                }

                Request::GetStatus { reply_tx } => {
                    let _ = reply_tx.send(CoordinatorStatus {
                        fsm_state: fsm_state.clone(),
                        turn_type: *turn_tx.borrow(),
                        forwarding_pose: forwarding.load(Ordering::SeqCst),
                        metrics: metrics.clone(),
                    });
                }

                Request::Shutdown => {
                    info!("Coordinator shutting down");
                    cancel_tx.send_replace(true);
                    break;
                }
            }
        }

        info!("Coordinator stopped");
    }
}
