//! # Domain Module
//!
//! Core ledger types, operations and invariants.

pub mod address;
pub mod bridge;
pub mod entities;
pub mod errors;
pub mod invariants;
pub mod ledger;
pub mod value_objects;

pub use address::{is_valid, normalize};
pub use bridge::{BurnReceipt, CrossChainBurn, CrossChainMint};
pub use entities::*;
pub use errors::*;
pub use invariants::*;
pub use value_objects::*;
