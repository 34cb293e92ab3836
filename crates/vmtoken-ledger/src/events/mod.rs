//! # Action Payloads
//!
//! Wire types exchanged with the host.
//!
//! - `ActionEnvelope`: inbound action with string parameters
//! - `OutboundMessage`: notification with tags and optional data
//! - `ApplyResult`: messages + cache deltas + optional error
//! - `SpawnParams`: construction-time parameters

pub mod payloads;

pub use payloads::*;
