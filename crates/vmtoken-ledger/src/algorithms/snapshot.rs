//! # Snapshot Codec
//!
//! Serializes the whole aggregate to one JSON blob and rebuilds it.
//!
//! Amounts are written as decimal strings. On restore, decimal strings and
//! non-negative JSON integers are both accepted, absent or `null` maps come
//! back empty and absent amounts come back as zero. Historical invariants
//! are not re-validated.

use crate::domain::{
    AccountId, Amount, BridgeRegistry, Ledger, LockKey, SnapshotError, SupplyCap, TokenInfo,
    TokenKind, TokenState,
};
use crate::domain::value_objects::{parse_signed, parse_unsigned};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// An amount as found in a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Text(String),
    Number(serde_json::Number),
}

impl RawAmount {
    fn text(amount: &Amount) -> Self {
        RawAmount::Text(amount.to_string())
    }

    fn raw(&self) -> String {
        match self {
            RawAmount::Text(s) => s.clone(),
            RawAmount::Number(n) => n.to_string(),
        }
    }

    fn unsigned(&self, field: &str) -> Result<Amount, SnapshotError> {
        parse_unsigned(&self.raw()).ok_or_else(|| SnapshotError::InvalidAmount {
            field: field.to_string(),
            value: self.raw(),
        })
    }

    fn signed(&self, field: &str) -> Result<BigInt, SnapshotError> {
        parse_signed(&self.raw()).ok_or_else(|| SnapshotError::InvalidAmount {
            field: field.to_string(),
            value: self.raw(),
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotDoc {
    #[serde(default, deserialize_with = "null_as_default")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    ticker: String,
    #[serde(default, deserialize_with = "null_as_default")]
    decimals: String,
    #[serde(default, deserialize_with = "null_as_default")]
    logo: String,
    #[serde(default, deserialize_with = "null_as_default")]
    description: String,
    #[serde(default)]
    total_supply: Option<RawAmount>,
    #[serde(default, deserialize_with = "null_as_default")]
    balances: BTreeMap<String, RawAmount>,
    #[serde(default, deserialize_with = "null_as_default")]
    owner: String,
    #[serde(default, deserialize_with = "null_as_default")]
    mint_owner: String,
    #[serde(default)]
    max_supply: Option<RawAmount>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    minted_records: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_token_chains: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_lock_amounts: Option<BTreeMap<String, RawAmount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    burn_fees: Option<BTreeMap<String, RawAmount>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fee_recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    burn_processor: Option<String>,
}

impl SnapshotDoc {
    fn has_bridge_fields(&self) -> bool {
        self.minted_records.as_ref().is_some_and(|m| !m.is_empty())
            || self.source_token_chains.as_ref().is_some_and(|m| !m.is_empty())
            || self.source_lock_amounts.as_ref().is_some_and(|m| !m.is_empty())
            || self.burn_fees.as_ref().is_some_and(|m| !m.is_empty())
            || self.fee_recipient.as_ref().is_some_and(|s| !s.is_empty())
            || self.burn_processor.as_ref().is_some_and(|s| !s.is_empty())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn amounts_to_raw<K: ToString>(map: &BTreeMap<K, Amount>) -> BTreeMap<String, RawAmount> {
    map.iter()
        .map(|(k, v)| (k.to_string(), RawAmount::text(v)))
        .collect()
}

/// Serialize `state` to a snapshot blob.
pub fn checkpoint(state: &TokenState) -> Result<String, SnapshotError> {
    let ledger = &state.ledger;
    let mut doc = SnapshotDoc {
        id: ledger.info.id.clone(),
        name: ledger.info.name.clone(),
        ticker: ledger.info.ticker.clone(),
        decimals: ledger.info.decimals.clone(),
        logo: ledger.info.logo.clone(),
        description: ledger.info.description.clone(),
        total_supply: Some(RawAmount::text(&ledger.total_supply)),
        balances: amounts_to_raw(&ledger.balances),
        owner: ledger.owner.to_string(),
        mint_owner: ledger.mint_owner.to_string(),
        max_supply: Some(RawAmount::Text(ledger.max_supply.to_decimal_string())),
        ..Default::default()
    };

    if let Some(bridge) = &state.bridge {
        doc.minted_records = Some(bridge.minted_records.clone());
        doc.source_token_chains = Some(
            bridge
                .source_token_chains
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        );
        doc.source_lock_amounts = Some(amounts_to_raw(&bridge.source_lock_amounts));
        doc.burn_fees = Some(amounts_to_raw(&bridge.burn_fees));
        doc.fee_recipient = Some(bridge.fee_recipient.to_string());
        doc.burn_processor = Some(bridge.burn_processor.to_string());
    }

    Ok(serde_json::to_string(&doc)?)
}

/// Rebuild state for an instance of `kind` from a snapshot blob.
///
/// The returned state has `cache_bootstrapped == false`.
pub fn restore(blob: &str, kind: TokenKind) -> Result<TokenState, SnapshotError> {
    let doc: SnapshotDoc = serde_json::from_str(blob)?;

    let mut balances = BTreeMap::new();
    for (account, raw) in &doc.balances {
        let amount = raw.unsigned("balances")?;
        balances.insert(AccountId::from_canonical(account.as_str()), amount);
    }

    let total_supply = match &doc.total_supply {
        Some(raw) => raw.unsigned("totalSupply")?,
        None => Amount::default(),
    };
    let max_supply = match &doc.max_supply {
        Some(raw) => SupplyCap::from_signed(&raw.signed("maxSupply")?),
        None => SupplyCap::Uncapped,
    };

    let owner = AccountId::from_canonical(doc.owner.as_str());
    let ledger = Ledger {
        info: TokenInfo {
            id: doc.id.clone(),
            name: doc.name.clone(),
            ticker: doc.ticker.clone(),
            decimals: doc.decimals.clone(),
            logo: doc.logo.clone(),
            description: doc.description.clone(),
        },
        owner: owner.clone(),
        mint_owner: AccountId::from_canonical(doc.mint_owner.as_str()),
        balances,
        total_supply,
        max_supply,
    };

    let bridge = match kind {
        TokenKind::Basic => {
            if doc.has_bridge_fields() {
                warn!(
                    "[vmtoken] Ignoring bridge fields in snapshot of basic token {}",
                    doc.id
                );
            }
            None
        }
        TokenKind::CrossChain => Some(restore_bridge(doc, owner)?),
    };

    Ok(TokenState::new(kind, ledger, bridge))
}

fn restore_bridge(doc: SnapshotDoc, owner: AccountId) -> Result<BridgeRegistry, SnapshotError> {
    let mut burn_fees = BTreeMap::new();
    for (chain, raw) in doc.burn_fees.unwrap_or_default() {
        burn_fees.insert(chain, raw.unsigned("burnFees")?);
    }

    let mut source_lock_amounts = BTreeMap::new();
    for (key, raw) in doc.source_lock_amounts.unwrap_or_default() {
        let amount = raw.unsigned("sourceLockAmounts")?;
        let key = LockKey::parse(&key).ok_or(SnapshotError::InvalidLockKey(key))?;
        source_lock_amounts.insert(key, amount);
    }

    let source_token_chains = doc
        .source_token_chains
        .unwrap_or_default()
        .into_iter()
        .map(|(token, chain)| (AccountId::from_canonical(token), chain))
        .collect();

    let role_or_owner = |role: Option<String>| match role {
        Some(id) if !id.is_empty() => AccountId::from_canonical(id),
        _ => owner.clone(),
    };

    Ok(BridgeRegistry {
        source_token_chains,
        source_lock_amounts,
        burn_fees,
        fee_recipient: role_or_owner(doc.fee_recipient),
        burn_processor: role_or_owner(doc.burn_processor),
        minted_records: doc.minted_records.unwrap_or_default(),
    })
}
