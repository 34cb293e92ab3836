//! # vmtoken Ledger
//!
//! Fungible-token ledger with chain bridging.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Account for a token whose supply enters by being locked on an external
//! chain and minted here, and leaves by being burned here and released on
//! a target chain:
//! - Balances, total supply and an optional supply cap
//! - Per-source-token chain bindings and lock amounts
//! - Replay protection for inbound bridge transactions
//! - Burn fees credited to a fee recipient
//! - Checkpoint / restore and incremental cache deltas
//!
//! ## Accounting Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Conservation | Total supply equals the sum of balances |
//! | Lock backing | Locks move by exactly what enters or leaves circulation |
//! | Replay | A bridge transaction id mints at most once |
//! | Binding | A source token stays on the chain it was first seen on |
//!
//! ## Module Structure
//!
//! ```text
//! vmtoken-ledger/
//! ├── domain/          # Ledger, BridgeRegistry, AccountId, errors
//! ├── algorithms/      # Snapshot codec, cache projector
//! ├── events/          # Envelopes, notices, results
//! ├── ports/           # TokenLedgerApi, CacheSink, SnapshotStore
//! ├── adapters/        # In-memory port implementations
//! └── ipc/             # TokenHandler action dispatch
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod events;
pub mod ipc;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryCacheSink, InMemorySnapshotStore};
pub use algorithms::{
    balance_key, checkpoint, full_projection, mutation_delta, restore, CacheDelta, CacheInfo,
    Mutation, INFO_KEY, TOTAL_SUPPLY_KEY,
};
pub use domain::{
    invariant_lock_keys_bound, invariant_locks_back_supply, invariant_no_zero_balances,
    invariant_supply_conservation, normalize, parse_quantity, AccountId, AddressError, Amount,
    BridgeRegistry, BurnReceipt, CrossChainBurn, CrossChainMint, Ledger, LockKey, SnapshotError,
    SupplyCap, TokenError, TokenInfo, TokenKind, TokenState,
};
pub use events::{ActionEnvelope, ApplyResult, OutboundMessage, SpawnParams, Tag};
pub use ipc::TokenHandler;
pub use ports::{CacheSink, SnapshotStore, StoreError, TokenLedgerApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
