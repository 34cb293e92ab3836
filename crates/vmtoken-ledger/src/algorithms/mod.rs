//! # Algorithms Module
//!
//! Snapshot codec and cache projection.

pub mod projector;
pub mod snapshot;

pub use projector::{
    balance_key, full_projection, mutation_delta, CacheDelta, CacheInfo, Mutation, INFO_KEY,
    TOTAL_SUPPLY_KEY,
};
pub use snapshot::{checkpoint, restore};
