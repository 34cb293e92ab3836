//! In-Memory Snapshot Store Adapter
//!
//! Implements `SnapshotStore` keeping the latest blob per instance.

use crate::ports::outbound::{SnapshotStore, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

/// Checkpoint store kept in process memory.
pub struct InMemorySnapshotStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for InMemorySnapshotStore {
    async fn save(&self, token_id: &str, blob: &str) -> Result<(), StoreError> {
        info!("[vmtoken] Saved checkpoint for {} ({} bytes)", token_id, blob.len());
        self.blobs
            .write()
            .insert(token_id.to_string(), blob.to_string());
        Ok(())
    }

    async fn load(&self, token_id: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.read().get(token_id).cloned())
    }
}
