//! # Bridge Operations
//!
//! Cross-chain mint and burn against the lock registry.
//!
//! ## Flow
//!
//! ```text
//! external chain            ledger
//! lock X on eth  ──mint──►  balance += q, lock[eth:X] += q
//! unlock on eth  ◄──burn──  balance -= q, fee -> FeeRecipient,
//!                           supply -= q - fee, lock[eth:X] -= q - fee
//! ```
//!
//! The fee stays in circulation, so `Σ locks == total supply` on a bridge
//! instance that only ever mints through the bridge.

use super::entities::{BridgeRegistry, Ledger};
use super::errors::TokenError;
use super::value_objects::{AccountId, Amount, LockKey};

/// Validated inputs of a cross-chain mint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossChainMint {
    /// Credited account.
    pub recipient: AccountId,
    /// Amount locked on the source chain.
    pub amount: Amount,
    /// Chain the source token lives on.
    pub source_chain_type: String,
    /// Canonical id of the locked token.
    pub source_token_id: AccountId,
    /// Bridge transaction id, consumed once.
    pub bridge_tx_id: String,
}

/// Validated inputs of a cross-chain burn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CrossChainBurn {
    /// Account debited.
    pub caller: AccountId,
    /// Beneficiary on the target chain.
    pub recipient: AccountId,
    /// Gross amount burned, fee included.
    pub amount: Amount,
    /// Source token to release.
    pub target_token_id: AccountId,
}

/// Outcome of a committed burn, for the burn notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BurnReceipt {
    /// Amount released on the target chain.
    pub net: Amount,
    /// Fee credited to the fee recipient.
    pub fee: Amount,
    /// Chain the token is released on.
    pub target_chain_type: String,
    /// Fee recipient at the time of the burn.
    pub fee_recipient: AccountId,
    /// Burn processor at the time of the burn.
    pub burn_processor: AccountId,
}

impl BridgeRegistry {
    /// Fail with `RepeatMint` if `bridge_tx_id` was already consumed.
    pub fn check_fresh_tx(&self, bridge_tx_id: &str) -> Result<(), TokenError> {
        if self.minted_records.contains_key(bridge_tx_id) {
            return Err(TokenError::RepeatMint(bridge_tx_id.to_string()));
        }
        Ok(())
    }

    /// Chain type `token` is bound to, if any.
    pub fn chain_of(&self, token: &str) -> Option<&str> {
        self.source_token_chains.get(token).map(String::as_str)
    }

    /// Locked amount for `key`; zero when absent.
    pub fn locked(&self, key: &LockKey) -> Amount {
        self.source_lock_amounts.get(key).cloned().unwrap_or_default()
    }

    /// Sum of all lock entries.
    pub fn total_locked(&self) -> Amount {
        self.source_lock_amounts.values().sum()
    }

    /// Mint against a lock on an external chain.
    ///
    /// Checks replay, chain binding and the supply cap before any state
    /// changes. The binding of a new source token is committed together
    /// with the mint.
    pub fn mint(&mut self, ledger: &mut Ledger, req: &CrossChainMint) -> Result<(), TokenError> {
        self.check_fresh_tx(&req.bridge_tx_id)?;

        if let Some(bound) = self.chain_of(req.source_token_id.as_str()) {
            if bound != req.source_chain_type {
                return Err(TokenError::IncorrectSourceChainType {
                    bound: bound.to_string(),
                    requested: req.source_chain_type.clone(),
                });
            }
        }

        ledger.check_mint(&req.amount)?;

        // commit
        ledger.mint(&req.recipient, &req.amount)?;
        self.source_token_chains
            .entry(req.source_token_id.clone())
            .or_insert_with(|| req.source_chain_type.clone());
        let key = LockKey::new(req.source_chain_type.clone(), req.source_token_id.clone());
        *self.source_lock_amounts.entry(key).or_default() += &req.amount;
        self.minted_records
            .insert(req.bridge_tx_id.clone(), req.source_chain_type.clone());
        Ok(())
    }

    /// Burn locally so the processor can release on the target chain.
    pub fn burn(
        &mut self,
        ledger: &mut Ledger,
        req: &CrossChainBurn,
    ) -> Result<BurnReceipt, TokenError> {
        let chain_type = self
            .chain_of(req.target_token_id.as_str())
            .ok_or_else(|| TokenError::IncorrectTargetTokenId(req.target_token_id.to_string()))?
            .to_string();

        let fee = self
            .burn_fees
            .get(&chain_type)
            .cloned()
            .ok_or_else(|| TokenError::MissingBurnFee(chain_type.clone()))?;

        if req.amount < fee {
            return Err(TokenError::IncorrectQuantity {
                amount: req.amount.clone(),
                fee,
            });
        }

        let key = LockKey::new(chain_type.clone(), req.target_token_id.clone());
        let locked = self
            .source_lock_amounts
            .get(&key)
            .cloned()
            .ok_or_else(|| TokenError::LockAmountEmpty(key.to_string()))?;

        let net = &req.amount - &fee;
        if locked < net {
            return Err(TokenError::InsufficientLockAmount {
                locked,
                requested: net,
            });
        }

        let available = ledger.balance_of(req.caller.as_str());
        if available < req.amount {
            return Err(TokenError::InsufficientBalance {
                required: req.amount.clone(),
                available,
            });
        }

        if ledger.total_supply < net {
            return Err(TokenError::InsufficientTotalSupply {
                total_supply: ledger.total_supply.clone(),
                requested: net,
            });
        }

        // commit
        ledger.sub(&req.caller, &req.amount)?;
        ledger.add(&self.fee_recipient, &fee);
        ledger.total_supply -= &net;
        self.source_lock_amounts.insert(key, locked - &net);

        Ok(BurnReceipt {
            net,
            fee,
            target_chain_type: chain_type,
            fee_recipient: self.fee_recipient.clone(),
            burn_processor: self.burn_processor.clone(),
        })
    }
}
