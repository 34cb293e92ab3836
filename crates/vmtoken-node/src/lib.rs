//! # vmtoken Node
//!
//! Local host for a single token instance.
//!
//! ## Modular Structure
//!
//! - `config` - Spawn parameters and persistence settings
//! - `adapters/` - File-backed checkpoint store
//! - `runtime` - Envelope loop, cache forwarding, checkpoints

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod runtime;

pub use adapters::FileSnapshotStore;
pub use config::{ConfigError, NodeConfig};
pub use runtime::{NodeError, NodeRuntime};
