//! # Adapters
//!
//! Host-side port implementations.

mod file_store;

pub use file_store::FileSnapshotStore;
