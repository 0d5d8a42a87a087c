//! stdin/stdout JSON-line transport
//!
//! The daemon speaks newline-delimited JSON: inbound signals arrive one
//! object per line on stdin, outbound events leave as stamped lines on
//! stdout. Logs go to a file, never stdout.

use chrono::{DateTime, Utc};
use eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::coordinator::{CoordinatorHandle, OutboundEvent};

/// Inbound signal line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InboundSignal {
    /// Turn classification (-1 unknown, 0 left, 1 straight, 2 right)
    TurnType { value: i32 },

    /// FSM state name
    FsmState { state: String },

    /// Go trigger for the traversal
    IntersectionGo { data: bool },

    /// Opaque pose update
    LanePose(Value),
}

/// Stamped wrapper for outbound lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub stamp: DateTime<Utc>,

    #[serde(flatten)]
    pub event: OutboundEvent,
}

/// Pump stdin signals into the coordinator until EOF
pub async fn pump_inbound(handle: CoordinatorHandle) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let signal = match serde_json::from_str::<InboundSignal>(line) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed signal line");
                continue;
            }
        };

        if dispatch(&handle, signal).await.is_err() {
            warn!("Coordinator unavailable, stopping signal pump");
            break;
        }
    }

    debug!("Signal input closed");
    Ok(())
}

async fn dispatch(handle: &CoordinatorHandle, signal: InboundSignal) -> Result<()> {
    match signal {
        InboundSignal::TurnType { value } => handle.turn_classified(value).await,
        InboundSignal::FsmState { state } => handle.fsm_state(&state).await,
        InboundSignal::IntersectionGo { data } => handle.go(data).await,
        InboundSignal::LanePose(pose) => handle.pose(pose).await,
    }
}

/// Write outbound events as stamped JSON lines on stdout
pub async fn pump_outbound(mut outbound_rx: mpsc::Receiver<OutboundEvent>) -> Result<()> {
    let mut stdout = tokio::io::stdout();

    while let Some(event) = outbound_rx.recv().await {
        let envelope = Envelope {
            stamp: Utc::now(),
            event,
        };
        let mut line = serde_json::to_string(&envelope)?;
        line.push('\n');
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
    }

    debug!("Outbound channel closed");
    Ok(())
}
