//! # Node Runtime
//!
//! Drives one token instance from a line-oriented envelope stream.
//!
//! ## Protocol
//!
//! Each input line is an `ActionEnvelope` as JSON. Each output line is the
//! `ApplyResult` with the envelope's `item_id`. Envelopes without an id get
//! a fresh UUID so notices can always reference them.
//!
//! ## Startup Sequence
//!
//! 1. Spawn the instance from config
//! 2. Restore the latest checkpoint, if the store has one
//! 3. Process lines until EOF or shutdown
//! 4. Write a final checkpoint

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vmtoken_ledger::{
    ActionEnvelope, ApplyResult, CacheSink, SnapshotError, SnapshotStore, StoreError, TokenError,
    TokenHandler, TokenLedgerApi,
};
use vmtoken_telemetry::{log_token_event, token_span};

use crate::config::NodeConfig;

/// Runtime failures. Rejected actions are not errors; they are replies.
#[derive(Debug, Error)]
pub enum NodeError {
    /// The instance could not be spawned.
    #[error("spawn failed: {0}")]
    Spawn(#[from] TokenError),

    /// A checkpoint could not be produced or restored.
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] SnapshotError),

    /// An outbound port failed.
    #[error("store failed: {0}")]
    Store(#[from] StoreError),

    /// Reading input or writing replies failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reply could not be encoded.
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One output line.
#[derive(Debug, Serialize)]
struct Reply<'a> {
    item_id: &'a str,
    #[serde(flatten)]
    result: &'a ApplyResult,
}

/// Output line for input that is not an envelope.
#[derive(Debug, Serialize)]
struct Malformed<'a> {
    error: &'static str,
    detail: &'a str,
}

/// The hosted instance plus its ports.
pub struct NodeRuntime {
    handler: Arc<TokenHandler>,
    cache: Arc<dyn CacheSink>,
    store: Option<Arc<dyn SnapshotStore>>,
    checkpoint_every: u64,
    committed_since_checkpoint: u64,
}

impl NodeRuntime {
    /// Spawn the instance described by `config`.
    pub fn new(
        config: &NodeConfig,
        cache: Arc<dyn CacheSink>,
        store: Option<Arc<dyn SnapshotStore>>,
    ) -> Result<Self, NodeError> {
        let handler = TokenHandler::spawn(config.kind, &config.spawn)?;

        Ok(Self {
            handler: Arc::new(handler),
            cache,
            store,
            checkpoint_every: config.checkpoint_every,
            committed_since_checkpoint: 0,
        })
    }

    /// Shared handle to the instance.
    pub fn handler(&self) -> Arc<TokenHandler> {
        Arc::clone(&self.handler)
    }

    /// Replace the spawned state with the stored checkpoint, if any.
    ///
    /// Returns whether a checkpoint was restored.
    pub async fn restore_latest(&self) -> Result<bool, NodeError> {
        let Some(store) = &self.store else {
            return Ok(false);
        };
        let id = self.handler.id();
        match store.load(&id).await? {
            Some(blob) => {
                self.handler.restore(&blob)?;
                log_token_event!(info, id, "[vmtoken] Restored from checkpoint", bytes = blob.len());
                Ok(true)
            }
            None => {
                debug!(token = %id, "[vmtoken] No checkpoint to restore");
                Ok(false)
            }
        }
    }

    /// Write a checkpoint through the store. No-op without one.
    pub async fn checkpoint(&mut self) -> Result<(), NodeError> {
        let Some(store) = &self.store else {
            return Ok(());
        };
        let id = self.handler.id();
        let blob = self.handler.checkpoint()?;
        store.save(&id, &blob).await?;
        log_token_event!(debug, id, "[vmtoken] Checkpoint saved", committed = self.committed_since_checkpoint);
        self.committed_since_checkpoint = 0;
        Ok(())
    }

    /// Apply one envelope, forward its cache deltas and checkpoint when due.
    ///
    /// Port failures after the handler committed are logged, never turned
    /// into a lost result. A failed periodic checkpoint is retried after the
    /// next committed mutation.
    pub async fn apply(&mut self, mut envelope: ActionEnvelope) -> ApplyResult {
        if envelope.item_id.is_none() {
            envelope.item_id = Some(Uuid::new_v4().to_string());
        }

        let result = {
            let _span =
                token_span!("apply", token = %self.handler.id(), action = %envelope.action)
                    .entered();
            self.handler.apply(&envelope)
        };

        if !result.cache.is_empty() {
            let id = self.handler.id();
            if let Err(e) = self.cache.apply(&id, &result.cache).await {
                warn!(token = %id, "[vmtoken] Cache forward failed: {}", e);
            }
        }

        if result.is_ok() && !envelope.is_query() {
            self.committed_since_checkpoint += 1;
            if self.checkpoint_every > 0 && self.committed_since_checkpoint >= self.checkpoint_every
            {
                if let Err(e) = self.checkpoint().await {
                    warn!("[vmtoken] Periodic checkpoint failed: {}", e);
                }
            }
        }
        result
    }

    /// Handle one input line. Blank lines produce no output.
    pub async fn handle_line(&mut self, line: &str) -> Result<Option<String>, NodeError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let mut envelope: ActionEnvelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("[vmtoken] Malformed envelope: {}", e);
                let detail = e.to_string();
                let reply = Malformed {
                    error: "err_malformed_envelope",
                    detail: &detail,
                };
                return Ok(Some(serde_json::to_string(&reply)?));
            }
        };

        let item_id = envelope
            .item_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();

        let result = self.apply(envelope).await;
        let reply = Reply {
            item_id: &item_id,
            result: &result,
        };
        Ok(Some(serde_json::to_string(&reply)?))
    }

    /// Process lines until EOF or until `shutdown` flips, then checkpoint.
    ///
    /// The final checkpoint is written even when the loop fails; the loop's
    /// error is returned afterwards.
    pub async fn run<R, W>(
        &mut self,
        reader: R,
        writer: W,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), NodeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let served = self.serve(reader, writer, shutdown).await;
        if let Err(e) = &served {
            warn!("[vmtoken] Input loop failed: {}", e);
        }
        self.checkpoint().await?;
        served
    }

    async fn serve<R, W>(
        &mut self,
        reader: R,
        mut writer: W,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), NodeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        info!("[vmtoken] Input closed");
                        return Ok(());
                    };
                    if let Some(reply) = self.handle_line(&line).await? {
                        writer.write_all(reply.as_bytes()).await?;
                        writer.write_all(b"\n").await?;
                        writer.flush().await?;
                    }
                }
                _ = shutdown.changed() => {
                    info!("[vmtoken] Shutdown signal received");
                    return Ok(());
                }
            }
        }
    }
}
