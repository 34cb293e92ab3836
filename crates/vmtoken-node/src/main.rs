//! # vmtoken Node
//!
//! Hosts one token instance over stdin/stdout.
//!
//! ```text
//! vmtoken-node token.json < envelopes.jsonl > results.jsonl
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (stderr)
//! 2. Load configuration (file + env)
//! 3. Spawn the instance and restore its checkpoint
//! 4. Process envelopes until EOF or Ctrl+C
//! 5. Write a final checkpoint

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{error, info};

use vmtoken_ledger::{InMemoryCacheSink, SnapshotStore};
use vmtoken_node::{FileSnapshotStore, NodeConfig, NodeRuntime};
use vmtoken_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    init_telemetry(TelemetryConfig::for_service("node")).context("Failed to init logging")?;

    let config = NodeConfig::load(std::env::args().nth(1)).context("Failed to load configuration")?;

    let store = config.checkpoint_path.as_ref().map(|dir| {
        info!("[vmtoken] Checkpoints in {}", dir.display());
        Arc::new(FileSnapshotStore::new(dir)) as Arc<dyn SnapshotStore>
    });
    let cache = Arc::new(InMemoryCacheSink::new());

    let mut runtime =
        NodeRuntime::new(&config, cache, store).context("Failed to spawn token instance")?;
    runtime
        .restore_latest()
        .await
        .context("Failed to restore checkpoint")?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        if let Err(e) = shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
    });

    info!("[vmtoken] Node is running. Press Ctrl+C to stop.");
    runtime
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), shutdown_rx)
        .await
        .context("Envelope loop failed")?;

    info!("Shutdown complete");
    Ok(())
}
