//! # vmtoken Test Suite
//!
//! Cross-crate flows and randomized accounting checks.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Accounts, spawn helpers, envelope builders
//! └── integration/
//!     ├── ledger_flows.rs     # Mint, transfer, caps, params, cache
//!     ├── bridge_flows.rs     # Cross-chain mint and burn
//!     ├── snapshot_flows.rs   # Checkpoint, stores, restart
//!     ├── concurrency.rs      # Readers never see half-applied transfers
//!     └── properties.rs       # Seeded random operation sequences
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p vmtoken-tests
//! cargo test -p vmtoken-tests integration::bridge_flows::
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]
