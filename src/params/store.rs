//! Parameter store implementations

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::turn::ProfileTable;

/// Errors from parameter store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse parameter file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Access to externally managed control parameters
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Read the full profile table, including the debug override
    async fn load_profiles(&self) -> Result<ProfileTable, StoreError>;

    /// Write the feed-forward angular-velocity bias for the lane controller
    async fn set_feed_forward(&self, omega: f64) -> Result<(), StoreError>;
}

/// File-backed store
///
/// Profiles come from a YAML file that may be edited at runtime; the
/// feed-forward value is written to a JSON control file the lane controller
/// watches.
pub struct FileParameterStore {
    profiles_path: PathBuf,
    feed_forward_path: PathBuf,
}

impl FileParameterStore {
    pub fn new(profiles_path: impl Into<PathBuf>, feed_forward_path: impl Into<PathBuf>) -> Self {
        Self {
            profiles_path: profiles_path.into(),
            feed_forward_path: feed_forward_path.into(),
        }
    }
}

#[async_trait]
impl ParameterStore for FileParameterStore {
    async fn load_profiles(&self) -> Result<ProfileTable, StoreError> {
        let content = tokio::fs::read_to_string(&self.profiles_path).await?;
        let table = serde_yaml::from_str(&content)?;
        Ok(table)
    }

    async fn set_feed_forward(&self, omega: f64) -> Result<(), StoreError> {
        debug!(omega, "Writing feed-forward control value");
        let payload = serde_json::json!({ "omega-ff": omega });
        tokio::fs::write(&self.feed_forward_path, payload.to_string()).await?;
        Ok(())
    }
}

/// In-memory store for tests and dry runs
///
/// Serves a fixed table and records every feed-forward write.
pub struct MemoryParameterStore {
    table: Mutex<ProfileTable>,
    feed_forward_writes: Mutex<Vec<f64>>,
    fail_loads: AtomicBool,
}

impl MemoryParameterStore {
    pub fn new(table: ProfileTable) -> Self {
        Self {
            table: Mutex::new(table),
            feed_forward_writes: Mutex::new(Vec::new()),
            fail_loads: AtomicBool::new(false),
        }
    }

    /// Replace the served table, simulating an external parameter edit
    pub async fn set_table(&self, table: ProfileTable) {
        *self.table.lock().await = table;
    }

    /// Every feed-forward value written so far, in order
    pub async fn feed_forward_writes(&self) -> Vec<f64> {
        self.feed_forward_writes.lock().await.clone()
    }

    /// Make subsequent loads fail, simulating an unreadable store
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn load_profiles(&self) -> Result<ProfileTable, StoreError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("store unavailable")));
        }
        Ok(self.table.lock().await.clone())
    }

    async fn set_feed_forward(&self, omega: f64) -> Result<(), StoreError> {
        self.feed_forward_writes.lock().await.push(omega);
        Ok(())
    }
}
