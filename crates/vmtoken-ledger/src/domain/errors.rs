//! # Domain Errors
//!
//! Error types for the token ledger.
//!
//! Every rejected operation maps to exactly one `TokenError` variant. The
//! `code()` of a variant is the stable identifier put on the wire in
//! `*-Error` notifications; `Display` is for logs.

use super::value_objects::Amount;
use thiserror::Error;

/// Ledger operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    // =========================================================================
    // SPAWN / CONFIGURATION
    // =========================================================================
    /// Name, Ticker or Decimals missing at spawn.
    #[error("Incorrect token info: Name, Ticker and Decimals are required")]
    IncorrectTokenInfo,

    /// Owner parameter does not normalize.
    #[error("Invalid owner: {0}")]
    InvalidOwner(String),

    /// MintOwner parameter does not normalize.
    #[error("Invalid mint owner: {0}")]
    InvalidMintOwner(String),

    /// MaxSupply is not a decimal integer.
    #[error("Invalid max supply: {0}")]
    InvalidMaxSupply(String),

    /// FeeRecipient parameter does not normalize.
    #[error("Invalid fee recipient: {0}")]
    InvalidFeeRecipient(String),

    /// BurnProcessor parameter does not normalize.
    #[error("Invalid burn processor: {0}")]
    InvalidBurnProcessor(String),

    /// BurnFees is not a JSON object of decimal strings.
    #[error("Invalid burn fees: {0}")]
    InvalidBurnFees(String),

    // =========================================================================
    // AUTHORIZATION
    // =========================================================================
    /// Caller is not the Owner / MintOwner required by the action.
    #[error("Incorrect owner: {caller} is not authorized")]
    IncorrectOwner {
        /// The rejected caller.
        caller: String,
    },

    // =========================================================================
    // MALFORMED INPUT
    // =========================================================================
    /// Caller id does not normalize.
    #[error("Invalid sender: {0}")]
    InvalidFrom(String),

    /// Recipient parameter missing.
    #[error("Missing recipient")]
    MissingRecipient,

    /// Recipient does not normalize.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// Quantity parameter missing.
    #[error("Missing quantity")]
    MissingQuantity,

    /// Quantity is not a non-negative decimal integer.
    #[error("Invalid quantity format: {0:?}")]
    InvalidQuantityFormat(String),

    /// Bridge transaction id missing on a cross-chain mint.
    #[error("Missing mint transaction hash")]
    MissingMintTxHash,

    /// Source chain type missing on a cross-chain mint.
    #[error("Missing source chain type")]
    MissingSourceChain,

    /// Source token id missing on a cross-chain mint.
    #[error("Missing source token id")]
    MissingSourceTokenId,

    /// Source token id does not normalize.
    #[error("Invalid source token id: {0}")]
    InvalidSourceTokenId(String),

    /// Target token id missing on a cross-chain burn.
    #[error("Missing target token id")]
    MissingTargetTokenId,

    /// Target token id does not normalize.
    #[error("Invalid target token id: {0}")]
    InvalidTargetTokenId(String),

    /// Action is not known, or not available on this instance kind.
    #[error("Unsupported action: {0}")]
    UnsupportedAction(String),

    // =========================================================================
    // STATE CONFLICTS
    // =========================================================================
    /// Debit larger than the account balance.
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance {
        /// Amount requested.
        required: Amount,
        /// Current balance.
        available: Amount,
    },

    /// Mint would push total supply above the cap.
    #[error("Insufficient max supply: total {total_supply} + {requested} exceeds {max_supply}")]
    InsufficientMaxSupply {
        /// Current total supply.
        total_supply: Amount,
        /// Amount requested.
        requested: Amount,
        /// Configured cap.
        max_supply: Amount,
    },

    /// Bridge transaction id already consumed.
    #[error("Repeat mint: transaction {0} already processed")]
    RepeatMint(String),

    /// Source token already bound to another chain type.
    #[error("Incorrect source chain type: token bound to {bound}, got {requested}")]
    IncorrectSourceChainType {
        /// Chain type the token is bound to.
        bound: String,
        /// Chain type supplied.
        requested: String,
    },

    /// Target token never bridged in.
    #[error("Incorrect target token id: {0} has no chain binding")]
    IncorrectTargetTokenId(String),

    /// Burn amount smaller than the burn fee.
    #[error("Incorrect quantity: {amount} does not cover burn fee {fee}")]
    IncorrectQuantity {
        /// Amount requested.
        amount: Amount,
        /// Fee for the target chain.
        fee: Amount,
    },

    /// No lock entry for the burn target.
    #[error("Lock amount empty for {0}")]
    LockAmountEmpty(String),

    /// Lock entry smaller than the net burn amount.
    #[error("Insufficient lock amount: locked {locked}, requested {requested}")]
    InsufficientLockAmount {
        /// Currently locked.
        locked: Amount,
        /// Net amount to release.
        requested: Amount,
    },

    /// Total supply smaller than the net burn amount. Only reachable from an
    /// inconsistent restored checkpoint.
    #[error("Insufficient total supply: total {total_supply}, requested {requested}")]
    InsufficientTotalSupply {
        /// Current total supply.
        total_supply: Amount,
        /// Net amount to remove.
        requested: Amount,
    },

    // =========================================================================
    // CONFIGURATION
    // =========================================================================
    /// No burn fee configured for the target chain.
    #[error("Missing burn fee for chain {0}")]
    MissingBurnFee(String),
}

impl TokenError {
    /// Stable wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IncorrectTokenInfo => "err_incorrect_token_info",
            Self::InvalidOwner(_) => "err_invalid_owner",
            Self::InvalidMintOwner(_) => "err_invalid_mint_owner",
            Self::InvalidMaxSupply(_) => "err_invalid_max_supply",
            Self::InvalidFeeRecipient(_) => "err_invalid_fee_recipient",
            Self::InvalidBurnProcessor(_) => "err_invalid_burn_processor",
            Self::InvalidBurnFees(_) => "err_invalid_burn_fees",
            Self::IncorrectOwner { .. } => "err_incorrect_owner",
            Self::InvalidFrom(_) => "err_invalid_from",
            Self::MissingRecipient => "err_missing_recipient",
            Self::InvalidRecipient(_) => "err_invalid_recipient",
            Self::MissingQuantity => "err_missing_quantity",
            Self::InvalidQuantityFormat(_) => "err_invalid_quantity_format",
            Self::MissingMintTxHash => "err_missing_mint_tx_hash",
            Self::MissingSourceChain => "err_missing_source_chain",
            Self::MissingSourceTokenId => "err_missing_source_token_id",
            Self::InvalidSourceTokenId(_) => "err_invalid_source_token_id",
            Self::MissingTargetTokenId => "err_missing_target_token_id",
            Self::InvalidTargetTokenId(_) => "err_invalid_target_token_id",
            Self::UnsupportedAction(_) => "err_unsupported_action",
            Self::InsufficientBalance { .. } => "err_insufficient_balance",
            Self::InsufficientMaxSupply { .. } => "err_insufficient_max_supply",
            Self::RepeatMint(_) => "err_repeat_mint",
            Self::IncorrectSourceChainType { .. } => "err_incorrect_source_chain_type",
            Self::IncorrectTargetTokenId(_) => "err_incorrect_target_token_id",
            Self::IncorrectQuantity { .. } => "err_incorrect_quantity",
            Self::LockAmountEmpty(_) => "err_lock_amount_empty",
            Self::InsufficientLockAmount { .. } => "err_insufficient_lock_amount",
            Self::InsufficientTotalSupply { .. } => "err_insufficient_total_supply",
            Self::MissingBurnFee(_) => "err_missing_burn_fee",
        }
    }
}

/// Account id normalization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty identifier.
    #[error("Empty account id")]
    Empty,

    /// Neither a 43-char native id nor a 40-hex-digit EVM address.
    #[error("Unrecognized account id length: {0}")]
    InvalidLength(usize),

    /// Character outside the expected alphabet.
    #[error("Invalid character {ch:?} at position {position}")]
    InvalidCharacter {
        /// Offending character.
        ch: char,
        /// Byte position in the input.
        position: usize,
    },

    /// Native id whose last character carries bits beyond 32 bytes.
    #[error("Native id does not decode to 32 bytes: trailing {0:?}")]
    TrailingBits(char),
}

/// Checkpoint / restore errors.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Blob is not valid snapshot JSON.
    #[error("Malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Amount field is not a non-negative decimal integer.
    #[error("Invalid amount in snapshot field {field}: {value}")]
    InvalidAmount {
        /// Field name.
        field: String,
        /// Raw value.
        value: String,
    },

    /// Lock key is not of the form `chain:token`.
    #[error("Invalid lock key in snapshot: {0}")]
    InvalidLockKey(String),
}
