//! In-Memory Cache Sink Adapter
//!
//! Implements `CacheSink` with a key/value map per token instance.

use crate::algorithms::CacheDelta;
use crate::ports::outbound::{CacheSink, StoreError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;

/// Cache store kept in process memory.
pub struct InMemoryCacheSink {
    entries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl InMemoryCacheSink {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of keys cached for `token_id`.
    pub fn len(&self, token_id: &str) -> usize {
        self.entries.read().get(token_id).map_or(0, HashMap::len)
    }

    /// Whether nothing is cached for `token_id`.
    pub fn is_empty(&self, token_id: &str) -> bool {
        self.len(token_id) == 0
    }

    /// Copy of everything cached for `token_id`.
    pub fn snapshot(&self, token_id: &str) -> HashMap<String, String> {
        self.entries
            .read()
            .get(token_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for InMemoryCacheSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheSink for InMemoryCacheSink {
    async fn apply(&self, token_id: &str, delta: &CacheDelta) -> Result<(), StoreError> {
        if delta.is_empty() {
            return Ok(());
        }
        debug!("[vmtoken] Caching {} entries for {}", delta.len(), token_id);

        let mut entries = self.entries.write();
        let cache = entries.entry(token_id.to_string()).or_default();
        for (key, value) in delta {
            cache.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    async fn get(&self, token_id: &str, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .entries
            .read()
            .get(token_id)
            .and_then(|cache| cache.get(key))
            .cloned())
    }
}
