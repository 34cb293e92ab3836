//! # Cache Projector
//!
//! Computes the key/value entries the external cache must overwrite after
//! each mutation, plus the one-time full projection.
//!
//! | Key | Value |
//! |-----|-------|
//! | `balances:<account>` | decimal balance (`"0"` once pruned) |
//! | `total-supply` | decimal total supply |
//! | `info` | JSON [`CacheInfo`] |

use crate::domain::{AccountId, Amount, TokenState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cache delta: keys to overwrite.
pub type CacheDelta = BTreeMap<String, String>;

/// Total supply key.
pub const TOTAL_SUPPLY_KEY: &str = "total-supply";

/// Token info key.
pub const INFO_KEY: &str = "info";

/// Balance key prefix.
pub const BALANCE_KEY_PREFIX: &str = "balances:";

/// Cache key of `account`'s balance.
pub fn balance_key(account: &str) -> String {
    format!("{BALANCE_KEY_PREFIX}{account}")
}

/// Metadata view shared by the `info` cache entry and the `Info` reply.
///
/// Bridge maps are carried as JSON strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CacheInfo {
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub ticker: String,
    /// Decimal count.
    pub decimals: String,
    /// Logo reference.
    pub logo: String,
    /// Description.
    pub description: String,
    /// Owner account.
    pub owner: String,
    /// Mint owner account.
    pub mint_owner: String,
    /// Cap, `"0"` when uncapped.
    pub max_supply: String,
    /// JSON object chain -> fee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn_fees: Option<String>,
    /// Fee recipient account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<String>,
    /// Burn processor account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn_processor: Option<String>,
    /// JSON object source token -> chain type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_token_chains: Option<String>,
    /// JSON object `chain:token` -> locked amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lock_amounts: Option<String>,
}

impl CacheInfo {
    /// Build the view of `state`.
    pub fn of(state: &TokenState) -> Self {
        let ledger = &state.ledger;
        let mut info = CacheInfo {
            name: ledger.info.name.clone(),
            ticker: ledger.info.ticker.clone(),
            decimals: ledger.info.decimals.clone(),
            logo: ledger.info.logo.clone(),
            description: ledger.info.description.clone(),
            owner: ledger.owner.to_string(),
            mint_owner: ledger.mint_owner.to_string(),
            max_supply: ledger.max_supply.to_decimal_string(),
            ..Default::default()
        };

        if let Some(bridge) = &state.bridge {
            info.burn_fees = Some(amount_map_json(&bridge.burn_fees));
            info.fee_recipient = Some(bridge.fee_recipient.to_string());
            info.burn_processor = Some(bridge.burn_processor.to_string());
            let chains: BTreeMap<&str, &str> = bridge
                .source_token_chains
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            info.source_token_chains = Some(to_json(&chains));
            info.source_lock_amounts = Some(amount_map_json(&bridge.source_lock_amounts));
        }
        info
    }

    /// Serialized form stored under [`INFO_KEY`].
    pub fn to_json(&self) -> String {
        to_json(self)
    }
}

fn amount_map_json<K: ToString>(map: &BTreeMap<K, Amount>) -> String {
    let as_strings: BTreeMap<String, String> = map
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    to_json(&as_strings)
}

fn to_json<T: Serialize>(value: &T) -> String {
    // maps with string keys and plain structs always serialize
    serde_json::to_string(value).unwrap_or_default()
}

/// What a committed mutation touched.
#[derive(Clone, Copy, Debug)]
pub enum Mutation<'a> {
    /// Balance move between two accounts.
    Transfer {
        /// Debited account.
        from: &'a AccountId,
        /// Credited account.
        to: &'a AccountId,
    },
    /// Owner mint on a basic instance.
    Mint {
        /// Credited account.
        recipient: &'a AccountId,
    },
    /// Mint against an external lock.
    CrossChainMint {
        /// Credited account.
        recipient: &'a AccountId,
    },
    /// Burn releasing an external lock.
    CrossChainBurn {
        /// Debited account.
        caller: &'a AccountId,
        /// Account credited with the fee.
        fee_recipient: &'a AccountId,
    },
    /// Configuration change.
    SetParams,
}

/// Every balance, the total supply and the info entry.
pub fn full_projection(state: &TokenState) -> CacheDelta {
    let mut delta: CacheDelta = state
        .ledger
        .balances
        .iter()
        .map(|(account, amount)| (balance_key(account.as_str()), amount.to_string()))
        .collect();
    project_total_supply(state, &mut delta);
    project_info(state, &mut delta);
    delta
}

/// Entries affected by `mutation`, read from the post-mutation `state`.
pub fn mutation_delta(state: &TokenState, mutation: Mutation<'_>) -> CacheDelta {
    let mut delta = CacheDelta::new();
    match mutation {
        Mutation::Transfer { from, to } => {
            project_balances(state, &[from, to], &mut delta);
        }
        Mutation::Mint { recipient } => {
            project_balances(state, &[recipient], &mut delta);
            project_total_supply(state, &mut delta);
        }
        Mutation::CrossChainMint { recipient } => {
            project_balances(state, &[recipient], &mut delta);
            project_total_supply(state, &mut delta);
            project_info(state, &mut delta);
        }
        Mutation::CrossChainBurn {
            caller,
            fee_recipient,
        } => {
            project_balances(state, &[caller, fee_recipient], &mut delta);
            project_total_supply(state, &mut delta);
            project_info(state, &mut delta);
        }
        Mutation::SetParams => project_info(state, &mut delta),
    }
    delta
}

fn project_balances(state: &TokenState, accounts: &[&AccountId], delta: &mut CacheDelta) {
    for account in accounts {
        delta.insert(
            balance_key(account.as_str()),
            state.ledger.balance_of(account.as_str()).to_string(),
        );
    }
}

fn project_total_supply(state: &TokenState, delta: &mut CacheDelta) {
    delta.insert(
        TOTAL_SUPPLY_KEY.to_string(),
        state.ledger.total_supply.to_string(),
    );
}

fn project_info(state: &TokenState, delta: &mut CacheDelta) {
    delta.insert(INFO_KEY.to_string(), CacheInfo::of(state).to_json());
}
