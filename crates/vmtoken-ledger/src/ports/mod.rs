//! # Ports Module
//!
//! Hexagonal boundaries of a token instance.

pub mod inbound;
pub mod outbound;

pub use inbound::TokenLedgerApi;
pub use outbound::{CacheSink, SnapshotStore, StoreError};
