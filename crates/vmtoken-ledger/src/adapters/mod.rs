//! # Adapters Layer (Hexagonal Architecture)
//!
//! In-process implementations of the outbound ports.

mod cache_sink;
mod snapshot_store;

pub use cache_sink::InMemoryCacheSink;
pub use snapshot_store::InMemorySnapshotStore;
