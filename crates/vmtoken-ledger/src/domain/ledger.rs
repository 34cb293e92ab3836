//! # Ledger Operations
//!
//! Balance and supply mutation. Every operation validates first and only
//! then mutates, so an `Err` leaves the ledger untouched.

use super::entities::Ledger;
use super::errors::TokenError;
use super::value_objects::{AccountId, Amount};
use num_traits::Zero;

impl Ledger {
    /// Balance of `account`; zero when absent.
    pub fn balance_of(&self, account: &str) -> Amount {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    /// Fail if minting `amount` would exceed the supply cap.
    pub fn check_mint(&self, amount: &Amount) -> Result<(), TokenError> {
        self.max_supply.check(&self.total_supply, amount)
    }

    /// Credit `to` with newly created tokens.
    pub fn mint(&mut self, to: &AccountId, amount: &Amount) -> Result<(), TokenError> {
        self.check_mint(amount)?;
        if amount.is_zero() {
            return Ok(());
        }
        self.add(to, amount);
        self.total_supply += amount;
        Ok(())
    }

    /// Move `amount` from `from` to `to`.
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: &Amount,
    ) -> Result<(), TokenError> {
        self.sub(from, amount)?;
        self.add(to, amount);
        Ok(())
    }

    /// Debit `account`. Leaves total supply alone.
    pub fn sub(&mut self, account: &AccountId, amount: &Amount) -> Result<(), TokenError> {
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.balance_of(account.as_str());
        if available < *amount {
            return Err(TokenError::InsufficientBalance {
                required: amount.clone(),
                available,
            });
        }
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(account);
        } else {
            self.balances.insert(account.clone(), remaining);
        }
        Ok(())
    }

    /// Credit `account`. Leaves total supply alone.
    pub fn add(&mut self, account: &AccountId, amount: &Amount) {
        if amount.is_zero() {
            return;
        }
        *self.balances.entry(account.clone()).or_default() += amount;
    }

    /// Sum of all balances.
    pub fn balance_sum(&self) -> Amount {
        self.balances.values().sum()
    }
}
