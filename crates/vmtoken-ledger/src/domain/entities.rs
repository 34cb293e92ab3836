//! # Domain Entities
//!
//! The token aggregate: a [`Ledger`] plus an optional [`BridgeRegistry`],
//! wrapped in [`TokenState`] together with the cache bootstrap flag.

use super::value_objects::{AccountId, Amount, LockKey, SupplyCap, TokenInfo, TokenKind};
use std::collections::BTreeMap;

/// Balances, supply and roles.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    /// Identity and metadata.
    pub info: TokenInfo,
    /// May change configuration.
    pub owner: AccountId,
    /// May mint.
    pub mint_owner: AccountId,
    /// Account balances. Missing key reads as zero; zero entries are pruned.
    pub balances: BTreeMap<AccountId, Amount>,
    /// Sum of all balances.
    pub total_supply: Amount,
    /// Supply cap.
    pub max_supply: SupplyCap,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(
        info: TokenInfo,
        owner: AccountId,
        mint_owner: AccountId,
        max_supply: SupplyCap,
    ) -> Self {
        Self {
            info,
            owner,
            mint_owner,
            balances: BTreeMap::new(),
            total_supply: Amount::default(),
            max_supply,
        }
    }
}

/// Cross-chain lock bookkeeping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BridgeRegistry {
    /// Source token -> chain type it was first minted from. Write-once.
    pub source_token_chains: BTreeMap<AccountId, String>,
    /// Amount locked on each external chain per source token.
    pub source_lock_amounts: BTreeMap<LockKey, Amount>,
    /// Fixed burn fee per target chain type.
    pub burn_fees: BTreeMap<String, Amount>,
    /// Receives burn fees.
    pub fee_recipient: AccountId,
    /// Receives burn notices and performs the external unlock.
    pub burn_processor: AccountId,
    /// Consumed bridge transaction ids -> chain type.
    pub minted_records: BTreeMap<String, String>,
}

impl BridgeRegistry {
    /// Create an empty registry.
    pub fn new(
        fee_recipient: AccountId,
        burn_processor: AccountId,
        burn_fees: BTreeMap<String, Amount>,
    ) -> Self {
        Self {
            source_token_chains: BTreeMap::new(),
            source_lock_amounts: BTreeMap::new(),
            burn_fees,
            fee_recipient,
            burn_processor,
            minted_records: BTreeMap::new(),
        }
    }
}

/// Everything guarded by an instance's single lock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenState {
    /// Authoritative ledger.
    pub ledger: Ledger,
    /// Present exactly for [`TokenKind::CrossChain`] instances.
    pub bridge: Option<BridgeRegistry>,
    /// Set once the full cache projection has been emitted.
    pub cache_bootstrapped: bool,
}

impl TokenState {
    /// Assemble state for an instance of `kind`.
    ///
    /// A bridge registry supplied for a basic instance is discarded; a
    /// cross-chain instance without one gets an empty registry owned by
    /// the ledger owner.
    pub fn new(kind: TokenKind, ledger: Ledger, bridge: Option<BridgeRegistry>) -> Self {
        let bridge = match kind {
            TokenKind::Basic => None,
            TokenKind::CrossChain => Some(bridge.unwrap_or_else(|| {
                BridgeRegistry::new(ledger.owner.clone(), ledger.owner.clone(), BTreeMap::new())
            })),
        };
        Self {
            ledger,
            bridge,
            cache_bootstrapped: false,
        }
    }

    /// Instance kind.
    pub fn kind(&self) -> TokenKind {
        if self.bridge.is_some() {
            TokenKind::CrossChain
        } else {
            TokenKind::Basic
        }
    }
}
