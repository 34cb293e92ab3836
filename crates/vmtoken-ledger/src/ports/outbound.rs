//! # Outbound Ports
//!
//! Traits for the external cache and checkpoint persistence.

use crate::algorithms::CacheDelta;
use async_trait::async_trait;
use thiserror::Error;

/// Failure of an outbound adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem or transport failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend refused or is unreachable.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// External cache store - outbound port.
///
/// Receives deltas and overwrites by key. Never asked to delete.
#[async_trait]
pub trait CacheSink: Send + Sync {
    /// Overwrite every key in `delta` for instance `token_id`.
    async fn apply(&self, token_id: &str, delta: &CacheDelta) -> Result<(), StoreError>;

    /// Current cached value of `key`.
    async fn get(&self, token_id: &str, key: &str) -> Result<Option<String>, StoreError>;
}

/// Checkpoint persistence - outbound port.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Persist the latest blob for `token_id`, replacing any previous one.
    async fn save(&self, token_id: &str, blob: &str) -> Result<(), StoreError>;

    /// Latest blob for `token_id`, if one was saved.
    async fn load(&self, token_id: &str) -> Result<Option<String>, StoreError>;
}
