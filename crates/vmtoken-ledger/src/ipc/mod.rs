//! # Action Handling
//!
//! Entry point for hosts: spawn an instance, then feed it envelopes.

pub mod handler;
pub mod params;

pub use handler::TokenHandler;
pub use params::{parse_burn_fees, spawn_state, ParamUpdate};
