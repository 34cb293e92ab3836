//! # Domain Invariants
//!
//! Accounting rules that hold between operations.

use super::entities::{Ledger, TokenState};
use num_traits::Zero;

/// Invariant: supply conservation.
///
/// Total supply equals the sum of all balances.
pub fn invariant_supply_conservation(ledger: &Ledger) -> bool {
    ledger.balance_sum() == ledger.total_supply
}

/// Invariant: no stored zero balances.
///
/// Debits that empty an account remove its entry.
pub fn invariant_no_zero_balances(ledger: &Ledger) -> bool {
    ledger.balances.values().all(|b| !b.is_zero())
}

/// Invariant: lock backing.
///
/// On a bridge instance every token in circulation was minted against a
/// lock, and burns release exactly what leaves circulation, so the locks
/// sum to the total supply. Trivially true for basic instances.
pub fn invariant_locks_back_supply(state: &TokenState) -> bool {
    match &state.bridge {
        Some(bridge) => bridge.total_locked() == state.ledger.total_supply,
        None => true,
    }
}

/// Invariant: every lock key refers to a bound source token on that chain.
pub fn invariant_lock_keys_bound(state: &TokenState) -> bool {
    match &state.bridge {
        Some(bridge) => bridge
            .source_lock_amounts
            .keys()
            .all(|key| bridge.chain_of(key.token_id.as_str()) == Some(key.chain_type.as_str())),
        None => true,
    }
}
