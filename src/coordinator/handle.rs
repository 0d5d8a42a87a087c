//! CoordinatorHandle - client interface for injecting signals

use eyre::{Result, eyre};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::messages::{CoordinatorStatus, Request};

/// Handle for transports and tests to interact with the coordinator
///
/// The handle is cloneable; all operations are async and non-blocking.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Request>,
}

impl CoordinatorHandle {
    pub(crate) fn new(tx: mpsc::Sender<Request>) -> Self {
        Self { tx }
    }

    /// Deliver a turn classification (wire integer, -1 = unknown)
    pub async fn turn_classified(&self, raw: i32) -> Result<()> {
        debug!(raw, "CoordinatorHandle::turn_classified: called");
        self.tx
            .send(Request::TurnClassified { raw })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))
    }

    /// Deliver an FSM state change
    pub async fn fsm_state(&self, state: &str) -> Result<()> {
        debug!(%state, "CoordinatorHandle::fsm_state: called");
        self.tx
            .send(Request::FsmState {
                state: state.to_string(),
            })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))
    }

    /// Deliver a go command
    pub async fn go(&self, data: bool) -> Result<()> {
        debug!(data, "CoordinatorHandle::go: called");
        self.tx
            .send(Request::Go { data })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))
    }

    /// Deliver a pose update
    pub async fn pose(&self, pose: Value) -> Result<()> {
        self.tx
            .send(Request::Pose { pose })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))
    }

    /// Get a snapshot of coordinator state and counters
    pub async fn status(&self) -> Result<CoordinatorStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.tx
            .send(Request::GetStatus { reply_tx })
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))?;

        reply_rx.await.map_err(|_| eyre!("Coordinator shutdown before reply"))
    }

    /// Request shutdown, cancelling any in-flight traversal
    pub async fn shutdown(&self) -> Result<()> {
        debug!("CoordinatorHandle::shutdown: called");
        self.tx
            .send(Request::Shutdown)
            .await
            .map_err(|_| eyre!("Coordinator channel closed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let handle = CoordinatorHandle::new(tx);
        assert!(handle.go(true).await.is_err());
        assert!(handle.status().await.is_err());
    }

    #[tokio::test]
    async fn test_handle_forwards_requests() {
        let (tx, mut rx) = mpsc::channel(4);
        let handle = CoordinatorHandle::new(tx);

        handle.turn_classified(2).await.unwrap();
        handle.fsm_state("LANE_FOLLOWING").await.unwrap();

        match rx.recv().await.unwrap() {
            Request::TurnClassified { raw } => assert_eq!(raw, 2),
            _ => panic!("Wrong request type"),
        }
        match rx.recv().await.unwrap() {
            Request::FsmState { state } => assert_eq!(state, "LANE_FOLLOWING"),
            _ => panic!("Wrong request type"),
        }
    }
}
