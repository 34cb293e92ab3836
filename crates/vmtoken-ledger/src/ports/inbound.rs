//! # Inbound Ports
//!
//! API trait defining what a token instance can do.

use crate::domain::{Amount, SnapshotError, TokenInfo, TokenKind};
use crate::events::{ActionEnvelope, ApplyResult};

/// Token ledger API - inbound port.
pub trait TokenLedgerApi: Send + Sync {
    /// Apply one action. Rejections are reported in the result, never panics.
    fn apply(&self, envelope: &ActionEnvelope) -> ApplyResult;

    /// Serialize the full aggregate.
    fn checkpoint(&self) -> Result<String, SnapshotError>;

    /// Replace the aggregate from a checkpoint. On error nothing changes.
    fn restore(&self, blob: &str) -> Result<(), SnapshotError>;

    /// Balance of `account` (raw id, normalized before lookup).
    fn balance_of(&self, account: &str) -> Amount;

    /// Current total supply.
    fn total_supply(&self) -> Amount;

    /// Identity and metadata.
    fn info(&self) -> TokenInfo;

    /// Instance kind.
    fn kind(&self) -> TokenKind;
}
