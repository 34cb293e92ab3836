//! # Parameter Parsing
//!
//! Turns string parameters into typed values for spawn and `Set-Params`.
//! Every value is validated before anything is applied.

use crate::domain::value_objects::parse_unsigned;
use crate::domain::{
    normalize, AccountId, Amount, BridgeRegistry, Ledger, SupplyCap, TokenError, TokenInfo,
    TokenKind, TokenState,
};
use crate::events::SpawnParams;
use std::collections::BTreeMap;

/// Params required at spawn.
pub const REQUIRED_SPAWN_PARAMS: [&str; 3] = ["Name", "Ticker", "Decimals"];

/// Non-empty value of `name`.
pub fn non_empty<'a>(params: &'a BTreeMap<String, String>, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Normalize an optional account param, mapping failure to `invalid`.
pub fn optional_account(
    raw: Option<&str>,
    invalid: fn(String) -> TokenError,
) -> Result<Option<AccountId>, TokenError> {
    raw.map(|raw| normalize(raw).map_err(|_| invalid(raw.to_string())))
        .transpose()
}

/// Parse a `BurnFees` JSON object of chain type -> decimal fee.
pub fn parse_burn_fees(raw: &str) -> Result<BTreeMap<String, Amount>, TokenError> {
    let invalid = || TokenError::InvalidBurnFees(raw.to_string());
    let entries: BTreeMap<String, String> = serde_json::from_str(raw).map_err(|_| invalid())?;

    let mut fees = BTreeMap::new();
    for (chain, fee) in entries {
        if chain.is_empty() {
            return Err(invalid());
        }
        fees.insert(chain, parse_unsigned(&fee).ok_or_else(invalid)?);
    }
    Ok(fees)
}

/// Build the initial state of a new instance.
pub fn spawn_state(kind: TokenKind, spawn: &SpawnParams) -> Result<TokenState, TokenError> {
    let params = &spawn.params;
    if REQUIRED_SPAWN_PARAMS
        .iter()
        .any(|name| non_empty(params, name).is_none())
    {
        return Err(TokenError::IncorrectTokenInfo);
    }

    let creator =
        normalize(&spawn.creator).map_err(|_| TokenError::InvalidOwner(spawn.creator.clone()))?;
    let mint_owner = optional_account(non_empty(params, "MintOwner"), TokenError::InvalidMintOwner)?
        .unwrap_or_else(|| creator.clone());
    let max_supply = match non_empty(params, "MaxSupply") {
        Some(raw) => SupplyCap::parse(raw)?,
        None => SupplyCap::Uncapped,
    };

    let info = TokenInfo {
        id: spawn.id.clone(),
        name: non_empty(params, "Name").unwrap_or_default().to_string(),
        ticker: non_empty(params, "Ticker").unwrap_or_default().to_string(),
        decimals: non_empty(params, "Decimals").unwrap_or_default().to_string(),
        logo: non_empty(params, "Logo").unwrap_or_default().to_string(),
        description: non_empty(params, "Description")
            .unwrap_or_default()
            .to_string(),
    };
    let ledger = Ledger::new(info, creator.clone(), mint_owner, max_supply);

    let bridge = match kind {
        TokenKind::Basic => None,
        TokenKind::CrossChain => {
            let burn_fees = match non_empty(params, "BurnFees") {
                Some(raw) => parse_burn_fees(raw)?,
                None => BTreeMap::new(),
            };
            let fee_recipient =
                optional_account(non_empty(params, "FeeRecipient"), TokenError::InvalidFeeRecipient)?
                    .unwrap_or_else(|| creator.clone());
            let burn_processor = optional_account(
                non_empty(params, "BurnProcessor"),
                TokenError::InvalidBurnProcessor,
            )?
            .unwrap_or_else(|| creator.clone());
            Some(BridgeRegistry::new(fee_recipient, burn_processor, burn_fees))
        }
    };

    Ok(TokenState::new(kind, ledger, bridge))
}

/// A validated `Set-Params` request. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParamUpdate {
    /// New owner.
    pub owner: Option<AccountId>,
    /// New mint owner.
    pub mint_owner: Option<AccountId>,
    /// New name.
    pub name: Option<String>,
    /// New ticker.
    pub ticker: Option<String>,
    /// New decimal count.
    pub decimals: Option<String>,
    /// New logo.
    pub logo: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New supply cap.
    pub max_supply: Option<SupplyCap>,
    /// New fee recipient (bridge only).
    pub fee_recipient: Option<AccountId>,
    /// New burn processor (bridge only).
    pub burn_processor: Option<AccountId>,
    /// Fees merged into the existing table (bridge only).
    pub burn_fees: Option<BTreeMap<String, Amount>>,
}

impl ParamUpdate {
    /// Validate every recognized param. Bridge params are ignored unless
    /// `bridge` is set.
    pub fn parse(params: &BTreeMap<String, String>, bridge: bool) -> Result<Self, TokenError> {
        let owner_raw = non_empty(params, "Owner").or_else(|| non_empty(params, "TokenOwner"));
        let text = |name: &str| non_empty(params, name).map(str::to_string);

        let mut update = ParamUpdate {
            owner: optional_account(owner_raw, TokenError::InvalidOwner)?,
            mint_owner: optional_account(non_empty(params, "MintOwner"), TokenError::InvalidMintOwner)?,
            name: text("Name"),
            ticker: text("Ticker"),
            decimals: text("Decimals"),
            logo: text("Logo"),
            description: text("Description"),
            max_supply: non_empty(params, "MaxSupply")
                .map(SupplyCap::parse)
                .transpose()?,
            ..Default::default()
        };

        if bridge {
            update.fee_recipient =
                optional_account(non_empty(params, "FeeRecipient"), TokenError::InvalidFeeRecipient)?;
            update.burn_processor = optional_account(
                non_empty(params, "BurnProcessor"),
                TokenError::InvalidBurnProcessor,
            )?;
            update.burn_fees = non_empty(params, "BurnFees")
                .map(parse_burn_fees)
                .transpose()?;
        }
        Ok(update)
    }

    /// Apply to `state`. Infallible once parsed.
    pub fn apply(self, state: &mut TokenState) {
        let ledger = &mut state.ledger;
        if let Some(owner) = self.owner {
            ledger.owner = owner;
        }
        if let Some(mint_owner) = self.mint_owner {
            ledger.mint_owner = mint_owner;
        }
        let info = &mut ledger.info;
        for (slot, value) in [
            (&mut info.name, self.name),
            (&mut info.ticker, self.ticker),
            (&mut info.decimals, self.decimals),
            (&mut info.logo, self.logo),
            (&mut info.description, self.description),
        ] {
            if let Some(value) = value {
                *slot = value;
            }
        }
        if let Some(max_supply) = self.max_supply {
            ledger.max_supply = max_supply;
        }

        if let Some(bridge) = state.bridge.as_mut() {
            if let Some(fee_recipient) = self.fee_recipient {
                bridge.fee_recipient = fee_recipient;
            }
            if let Some(burn_processor) = self.burn_processor {
                bridge.burn_processor = burn_processor;
            }
            if let Some(fees) = self.burn_fees {
                bridge.burn_fees.extend(fees);
            }
        }
    }
}
