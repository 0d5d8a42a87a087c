//! Periodic profile refresh
//!
//! The refresher re-reads the full profile table (including the debug
//! override) through the parameter store on a fixed period and overwrites
//! the in-memory table. A failed read keeps the prior table so malformed
//! values never reach control output.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::turn::ProfileTable;

use super::store::{ParameterStore, StoreError};

/// Keeps the shared profile table in sync with the parameter store
pub struct ProfileRefresher {
    interval: Duration,
    store: Arc<dyn ParameterStore>,
    profiles: Arc<RwLock<ProfileTable>>,
}

impl ProfileRefresher {
    pub fn new(interval: Duration, store: Arc<dyn ParameterStore>, profiles: Arc<RwLock<ProfileTable>>) -> Self {
        Self {
            interval,
            store,
            profiles,
        }
    }

    /// Run a single refresh; returns whether the table changed
    ///
    /// Overwrites are idempotent: identical store contents leave the table
    /// untouched.
    pub async fn refresh_once(&self) -> Result<bool, StoreError> {
        let table = self.store.load_profiles().await?;

        let mut current = self.profiles.write().await;
        if *current == table {
            return Ok(false);
        }

        info!("Turn profiles updated from parameter store");
        *current = table;
        Ok(true)
    }

    /// Run the refresh loop
    ///
    /// This runs until the task is dropped at shutdown.
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs_f64(), "Profile refresher started");

        loop {
            tokio::time::sleep(self.interval).await;

            match self.refresh_once().await {
                Ok(changed) => {
                    if changed {
                        debug!("Refreshed turn profiles");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Profile refresh failed, keeping previous values");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::MemoryParameterStore;
    use crate::turn::TurnType;

    fn refresher(store: Arc<MemoryParameterStore>) -> (ProfileRefresher, Arc<RwLock<ProfileTable>>) {
        let profiles = Arc::new(RwLock::new(ProfileTable::default()));
        let refresher = ProfileRefresher::new(Duration::from_millis(10), store, profiles.clone());
        (refresher, profiles)
    }

    #[tokio::test]
    async fn test_refresh_picks_up_changes() {
        let store = Arc::new(MemoryParameterStore::new(ProfileTable::default()));
        let (refresher, profiles) = refresher(store.clone());

        let mut table = ProfileTable::default();
        table.right.dwell_secs = 4.0;
        table.debug_turn = Some(TurnType::Straight);
        store.set_table(table).await;

        assert!(refresher.refresh_once().await.unwrap());

        let current = profiles.read().await;
        assert_eq!(current.right.dwell_secs, 4.0);
        assert_eq!(current.debug_turn, Some(TurnType::Straight));
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let store = Arc::new(MemoryParameterStore::new(ProfileTable::default()));
        let (refresher, profiles) = refresher(store);

        // Identical store contents: no observable difference either time
        assert!(!refresher.refresh_once().await.unwrap());
        let first = profiles.read().await.clone();

        assert!(!refresher.refresh_once().await.unwrap());
        assert_eq!(*profiles.read().await, first);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_prior_table() {
        let store = Arc::new(MemoryParameterStore::new(ProfileTable::default()));
        let (refresher, profiles) = refresher(store.clone());

        let mut table = ProfileTable::default();
        table.left.dwell_secs = 9.0;
        store.set_table(table).await;
        refresher.refresh_once().await.unwrap();

        store.set_fail_loads(true);
        assert!(refresher.refresh_once().await.is_err());

        // Prior values survive the failed read
        assert_eq!(profiles.read().await.left.dwell_secs, 9.0);
    }
}
