//! # Domain Value Objects
//!
//! Immutable value types for the token ledger: account ids, amounts,
//! supply caps and lock keys.

use super::errors::TokenError;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Token amount. Arbitrary precision, never negative.
pub type Amount = BigUint;

/// Canonical account identifier.
///
/// Constructed through [`normalize`](super::address::normalize) for any
/// externally supplied id, so two `AccountId`s compare equal exactly when
/// they name the same account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an id that is already canonical (restored state, tests).
    pub(crate) fn from_canonical(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as `&str`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AccountId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Instance kind, fixed at construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    /// Plain fungible token, owner-minted.
    #[default]
    Basic,
    /// Bridge-enabled token, minted against locks on external chains.
    CrossChain,
}

impl TokenKind {
    /// Whether the instance carries a bridge registry.
    pub fn is_bridge(&self) -> bool {
        matches!(self, TokenKind::CrossChain)
    }
}

/// Token identity and display metadata. Opaque strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Instance id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Ticker symbol.
    pub ticker: String,
    /// Decimal count, kept as supplied.
    pub decimals: String,
    /// Logo reference.
    pub logo: String,
    /// Free-form description.
    pub description: String,
}

/// Maximum supply policy.
///
/// A configured value of zero or below means uncapped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SupplyCap {
    /// No upper bound.
    #[default]
    Uncapped,
    /// Total supply may not exceed this value.
    Capped(Amount),
}

impl SupplyCap {
    /// Build from a signed configured value.
    pub fn from_signed(value: &BigInt) -> Self {
        match value.sign() {
            Sign::Plus => SupplyCap::Capped(value.magnitude().clone()),
            Sign::NoSign | Sign::Minus => SupplyCap::Uncapped,
        }
    }

    /// Parse a `MaxSupply` parameter.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        parse_signed(raw)
            .map(|v| Self::from_signed(&v))
            .ok_or_else(|| TokenError::InvalidMaxSupply(raw.to_string()))
    }

    /// Check that minting `requested` on top of `total_supply` stays in bounds.
    pub fn check(&self, total_supply: &Amount, requested: &Amount) -> Result<(), TokenError> {
        match self {
            SupplyCap::Uncapped => Ok(()),
            SupplyCap::Capped(max) => {
                if total_supply + requested > *max {
                    Err(TokenError::InsufficientMaxSupply {
                        total_supply: total_supply.clone(),
                        requested: requested.clone(),
                        max_supply: max.clone(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Wire form: the cap, or `"0"` when uncapped.
    pub fn to_decimal_string(&self) -> String {
        match self {
            SupplyCap::Uncapped => "0".to_string(),
            SupplyCap::Capped(max) => max.to_string(),
        }
    }
}

/// Key of a lock entry: the chain a source token lives on plus its id.
///
/// String form is `"<chainType>:<sourceTokenId>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockKey {
    /// External chain type.
    pub chain_type: String,
    /// Canonical source token id.
    pub token_id: AccountId,
}

impl LockKey {
    /// Create a key.
    pub fn new(chain_type: impl Into<String>, token_id: AccountId) -> Self {
        Self {
            chain_type: chain_type.into(),
            token_id,
        }
    }

    /// Parse the string form. Token ids never contain `:`, chain types may.
    pub fn parse(raw: &str) -> Option<Self> {
        let (chain, token) = raw.rsplit_once(':')?;
        if chain.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self::new(chain, AccountId::from_canonical(token)))
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_type, self.token_id)
    }
}

/// Parse a non-negative decimal integer. Signs, whitespace and separators
/// are rejected.
pub fn parse_quantity(raw: &str) -> Result<Amount, TokenError> {
    parse_unsigned(raw).ok_or_else(|| TokenError::InvalidQuantityFormat(raw.to_string()))
}

pub(crate) fn parse_unsigned(raw: &str) -> Option<Amount> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(raw.as_bytes(), 10)
}

pub(crate) fn parse_signed(raw: &str) -> Option<BigInt> {
    let (negative, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let magnitude = parse_unsigned(digits)?;
    if negative && !magnitude.is_zero() {
        Some(BigInt::from_biguint(Sign::Minus, magnitude))
    } else {
        Some(BigInt::from_biguint(Sign::Plus, magnitude))
    }
}
