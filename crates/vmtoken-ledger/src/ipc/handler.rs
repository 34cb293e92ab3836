//! # Action Handler
//!
//! Owns one token instance and turns action envelopes into results.
//!
//! ## Concurrency
//!
//! The whole aggregate sits behind one `parking_lot::RwLock`. Queries take
//! the shared lock, except the first one which emits the full cache
//! projection under the exclusive lock. Mutations, restore and the
//! validation that precedes a mutation run under the exclusive lock, so a
//! reader never observes a half-applied operation.
//!
//! ## Actions
//!
//! | Action | Kind | Mutates |
//! |--------|------|---------|
//! | `Info` | both | bootstrap flag only |
//! | `Total-Supply` / `TotalSupply` | both | bootstrap flag only |
//! | `Balance` | both | bootstrap flag only |
//! | `Set-Params` | both | metadata, roles, cap, bridge config |
//! | `Transfer` | both | balances |
//! | `Mint` | both | balances, supply (+ locks on bridge) |
//! | `Burn` | cross-chain | balances, supply, locks |

use super::params::{spawn_state, ParamUpdate};
use crate::algorithms::{self, full_projection, mutation_delta, CacheDelta, CacheInfo, Mutation};
use crate::domain::{
    normalize, parse_quantity, AccountId, Amount, CrossChainBurn, CrossChainMint, SnapshotError,
    TokenError, TokenInfo, TokenKind, TokenState,
};
use crate::events::{ActionEnvelope, ApplyResult, OutboundMessage, SpawnParams};
use crate::ports::inbound::TokenLedgerApi;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

/// Handler for a single token instance.
pub struct TokenHandler {
    /// Fixed at construction.
    kind: TokenKind,
    /// Ledger, bridge registry and cache flag.
    state: RwLock<TokenState>,
}

impl TokenHandler {
    /// Spawn a new instance from construction parameters.
    pub fn spawn(kind: TokenKind, spawn: &SpawnParams) -> Result<Self, TokenError> {
        let state = spawn_state(kind, spawn)?;
        info!(
            "[vmtoken] Spawned {:?} token {} ({}) owned by {}",
            kind, spawn.id, state.ledger.info.ticker, state.ledger.owner
        );
        Ok(Self::from_state(state))
    }

    /// Wrap existing state.
    pub fn from_state(state: TokenState) -> Self {
        Self {
            kind: state.kind(),
            state: RwLock::new(state),
        }
    }

    /// Instance id.
    pub fn id(&self) -> String {
        self.state.read().ledger.info.id.clone()
    }

    /// Run `f` against a consistent view of the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&TokenState) -> R) -> R {
        f(&self.state.read())
    }

    /// Apply one action.
    pub fn apply(&self, env: &ActionEnvelope) -> ApplyResult {
        let outcome = match env.action.as_str() {
            "Info" => self.query(env, Self::handle_info),
            "Total-Supply" | "TotalSupply" => self.query(env, Self::handle_total_supply),
            "Balance" => self.query(env, Self::handle_balance),
            "Set-Params" => self.handle_set_params(env),
            "Transfer" => self.handle_transfer(env),
            "Mint" => match self.kind {
                TokenKind::Basic => self.handle_mint(env),
                TokenKind::CrossChain => self.handle_cross_chain_mint(env),
            },
            "Burn" if self.kind.is_bridge() => self.handle_burn(env),
            other => Err(TokenError::UnsupportedAction(other.to_string())),
        };

        outcome.unwrap_or_else(|err| Self::rejection(env, err))
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Run a read-only handler, emitting the full projection the first time.
    fn query(
        &self,
        env: &ActionEnvelope,
        handler: fn(&TokenState, &ActionEnvelope) -> Result<OutboundMessage, TokenError>,
    ) -> Result<ApplyResult, TokenError> {
        {
            let state = self.state.read();
            if state.cache_bootstrapped {
                let message = handler(&state, env)?;
                return Ok(ApplyResult {
                    messages: vec![message],
                    ..Default::default()
                });
            }
        }

        let mut state = self.state.write();
        let message = handler(&state, env)?;
        let cache = if state.cache_bootstrapped {
            CacheDelta::new()
        } else {
            state.cache_bootstrapped = true;
            let projection = full_projection(&state);
            info!(
                "[vmtoken] Cache bootstrap for {}: {} entries",
                state.ledger.info.id,
                projection.len()
            );
            projection
        };

        Ok(ApplyResult {
            messages: vec![message],
            cache,
            error: None,
        })
    }

    fn handle_info(state: &TokenState, env: &ActionEnvelope) -> Result<OutboundMessage, TokenError> {
        debug!("[vmtoken] Info requested by {}", env.caller);
        let view = CacheInfo::of(state);
        let mut message = OutboundMessage::new(&env.caller)
            .tag("Name", &view.name)
            .tag("Ticker", &view.ticker)
            .tag("Logo", &view.logo)
            .tag("Decimals", &view.decimals)
            .tag("Description", &view.description)
            .tag("Owner", &view.owner)
            .tag("MintOwner", &view.mint_owner)
            .tag("MaxSupply", &view.max_supply);

        for (name, value) in [
            ("BurnFees", &view.burn_fees),
            ("FeeRecipient", &view.fee_recipient),
            ("BurnProcessor", &view.burn_processor),
            ("SourceTokenChains", &view.source_token_chains),
            ("SourceLockAmounts", &view.source_lock_amounts),
        ] {
            if let Some(value) = value {
                message = message.tag(name, value);
            }
        }
        Ok(message.data(view.to_json()))
    }

    fn handle_total_supply(
        state: &TokenState,
        env: &ActionEnvelope,
    ) -> Result<OutboundMessage, TokenError> {
        debug!("[vmtoken] Total supply requested by {}", env.caller);
        Ok(OutboundMessage::new(&env.caller)
            .tag("Action", "Total-Supply")
            .tag("Ticker", &state.ledger.info.ticker)
            .data(state.ledger.total_supply.to_string()))
    }

    fn handle_balance(
        state: &TokenState,
        env: &ActionEnvelope,
    ) -> Result<OutboundMessage, TokenError> {
        let raw = env
            .param("Recipient")
            .or_else(|| env.param("Target"))
            .unwrap_or(env.caller.as_str());
        let account = normalize(raw).map_err(|_| TokenError::InvalidRecipient(raw.to_string()))?;
        let balance = state.ledger.balance_of(account.as_str()).to_string();
        debug!("[vmtoken] Balance of {} is {}", account, balance);

        Ok(OutboundMessage::new(&env.caller)
            .tag("Balance", &balance)
            .tag("Ticker", &state.ledger.info.ticker)
            .tag("Account", account.as_str())
            .data(balance))
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    fn handle_set_params(&self, env: &ActionEnvelope) -> Result<ApplyResult, TokenError> {
        let mut state = self.state.write();
        Self::require_role(env, &state.ledger.owner)?;

        let update = ParamUpdate::parse(&env.params, self.kind.is_bridge())?;
        update.apply(&mut state);
        info!("[vmtoken] Params updated on {} by {}", state.ledger.info.id, env.caller);

        Ok(ApplyResult {
            messages: vec![OutboundMessage::new(&env.caller)
                .tag("Action", "Set-Params-Notice")
                .tag("Status", "success")],
            cache: mutation_delta(&state, Mutation::SetParams),
            error: None,
        })
    }

    fn handle_transfer(&self, env: &ActionEnvelope) -> Result<ApplyResult, TokenError> {
        let from =
            normalize(&env.caller).map_err(|_| TokenError::InvalidFrom(env.caller.clone()))?;
        let to = Self::recipient(env)?;
        let amount = Self::quantity(env)?;

        let mut state = self.state.write();
        state.ledger.transfer(&from, &to, &amount)?;
        info!("[vmtoken] Transfer {} from {} to {}", amount, from, to);

        let ticker = state.ledger.info.ticker.clone();
        let tx_id = env.item_id.clone().unwrap_or_default();
        let quantity = amount.to_string();

        let mut debit = OutboundMessage::new(from.as_str())
            .tag("Ticker", &ticker)
            .tag("Action", "Debit-Notice")
            .tag("Recipient", to.as_str())
            .tag("Quantity", &quantity)
            .tag("TransactionId", &tx_id)
            .data(format!("You transferred {quantity} to {to}"));
        let mut credit = OutboundMessage::new(to.as_str())
            .tag("Ticker", &ticker)
            .tag("Action", "Credit-Notice")
            .tag("Sender", from.as_str())
            .tag("Quantity", &quantity)
            .tag("TransactionId", &tx_id)
            .data(format!("You received {quantity} from {from}"));
        for (name, value) in env.forwarded_params() {
            debit = debit.tag(name, value);
            credit = credit.tag(name, value);
        }

        Ok(ApplyResult {
            messages: vec![debit, credit],
            cache: mutation_delta(&state, Mutation::Transfer { from: &from, to: &to }),
            error: None,
        })
    }

    fn handle_mint(&self, env: &ActionEnvelope) -> Result<ApplyResult, TokenError> {
        let mut state = self.state.write();
        let caller = Self::require_role(env, &state.ledger.mint_owner)?;
        let recipient = Self::recipient(env)?;
        let amount = Self::quantity(env)?;

        state.ledger.mint(&recipient, &amount)?;
        info!("[vmtoken] Minted {} to {}", amount, recipient);

        let notice = |target: &AccountId| {
            OutboundMessage::new(target.as_str())
                .tag("Action", "Mint-Notice")
                .tag("Recipient", recipient.as_str())
                .tag("Quantity", amount.to_string())
                .tag("Ticker", &state.ledger.info.ticker)
        };
        let messages = vec![notice(&caller), notice(&recipient)];

        Ok(ApplyResult {
            messages,
            cache: mutation_delta(&state, Mutation::Mint { recipient: &recipient }),
            error: None,
        })
    }

    fn handle_cross_chain_mint(&self, env: &ActionEnvelope) -> Result<ApplyResult, TokenError> {
        let mut guard = self.state.write();
        let state = &mut *guard;
        let caller = Self::require_role(env, &state.ledger.mint_owner)?;
        let bridge = state
            .bridge
            .as_mut()
            .ok_or_else(|| TokenError::UnsupportedAction(env.action.clone()))?;

        let bridge_tx_id = env
            .param("X-MintTxHash")
            .ok_or(TokenError::MissingMintTxHash)?;
        bridge.check_fresh_tx(bridge_tx_id)?;
        let recipient = Self::recipient(env)?;
        let amount = Self::quantity(env)?;
        let source_chain_type = env
            .param("SourceChainType")
            .ok_or(TokenError::MissingSourceChain)?;
        let raw_token = env
            .param("SourceTokenId")
            .ok_or(TokenError::MissingSourceTokenId)?;
        let source_token_id = normalize(raw_token)
            .map_err(|_| TokenError::InvalidSourceTokenId(raw_token.to_string()))?;

        let req = CrossChainMint {
            recipient,
            amount,
            source_chain_type: source_chain_type.to_string(),
            source_token_id,
            bridge_tx_id: bridge_tx_id.to_string(),
        };
        bridge.mint(&mut state.ledger, &req)?;
        info!(
            "[vmtoken] Cross-chain mint {} to {} from {}:{} (tx {})",
            req.amount, req.recipient, req.source_chain_type, req.source_token_id, req.bridge_tx_id
        );

        let notice = |target: &AccountId| {
            OutboundMessage::new(target.as_str())
                .tag("Action", "Mint-Notice")
                .tag("Recipient", req.recipient.as_str())
                .tag("Quantity", req.amount.to_string())
                .tag("Ticker", &state.ledger.info.ticker)
                .tag("SourceChainType", &req.source_chain_type)
                .tag("SourceTokenId", req.source_token_id.as_str())
                .tag("X-MintTxHash", &req.bridge_tx_id)
        };
        let messages = vec![notice(&caller), notice(&req.recipient)];

        Ok(ApplyResult {
            messages,
            cache: mutation_delta(
                state,
                Mutation::CrossChainMint {
                    recipient: &req.recipient,
                },
            ),
            error: None,
        })
    }

    fn handle_burn(&self, env: &ActionEnvelope) -> Result<ApplyResult, TokenError> {
        let raw_recipient = env
            .param("Recipient")
            .or_else(|| env.param("X-Recipient"))
            .unwrap_or(env.caller.as_str());
        let recipient = normalize(raw_recipient)
            .map_err(|_| TokenError::InvalidRecipient(raw_recipient.to_string()))?;
        let amount = Self::quantity(env)?;
        let raw_target = env
            .param("TargetTokenId")
            .ok_or(TokenError::MissingTargetTokenId)?;
        let target_token_id = normalize(raw_target)
            .map_err(|_| TokenError::InvalidTargetTokenId(raw_target.to_string()))?;
        let caller =
            normalize(&env.caller).map_err(|_| TokenError::InvalidFrom(env.caller.clone()))?;

        let mut guard = self.state.write();
        let state = &mut *guard;
        let bridge = state
            .bridge
            .as_mut()
            .ok_or_else(|| TokenError::UnsupportedAction(env.action.clone()))?;

        let req = CrossChainBurn {
            caller,
            recipient,
            amount,
            target_token_id,
        };
        let receipt = bridge.burn(&mut state.ledger, &req)?;
        info!(
            "[vmtoken] Burned {} from {} (net {}, fee {}) for {}:{}",
            req.amount,
            req.caller,
            receipt.net,
            receipt.fee,
            receipt.target_chain_type,
            req.target_token_id
        );

        let notice = OutboundMessage::new(receipt.burn_processor.as_str())
            .tag("Action", "Burn-Notice")
            .tag("Sender", req.caller.as_str())
            .tag("X-Recipient", req.recipient.as_str())
            .tag("Quantity", receipt.net.to_string())
            .tag("Ticker", &state.ledger.info.ticker)
            .tag("WrappedTokenId", &state.ledger.info.id)
            .tag("Fee", receipt.fee.to_string())
            .tag("FeeRecipient", receipt.fee_recipient.as_str())
            .tag("TargetChainType", &receipt.target_chain_type)
            .tag("TargetTokenId", req.target_token_id.as_str());

        Ok(ApplyResult {
            messages: vec![notice],
            cache: mutation_delta(
                state,
                Mutation::CrossChainBurn {
                    caller: &req.caller,
                    fee_recipient: &receipt.fee_recipient,
                },
            ),
            error: None,
        })
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    /// Normalized caller, if it holds `role`.
    fn require_role(env: &ActionEnvelope, role: &AccountId) -> Result<AccountId, TokenError> {
        match normalize(&env.caller) {
            Ok(caller) if &caller == role => Ok(caller),
            _ => Err(TokenError::IncorrectOwner {
                caller: env.caller.clone(),
            }),
        }
    }

    fn recipient(env: &ActionEnvelope) -> Result<AccountId, TokenError> {
        let raw = env.param("Recipient").ok_or(TokenError::MissingRecipient)?;
        normalize(raw).map_err(|_| TokenError::InvalidRecipient(raw.to_string()))
    }

    fn quantity(env: &ActionEnvelope) -> Result<Amount, TokenError> {
        let raw = env.param("Quantity").ok_or(TokenError::MissingQuantity)?;
        parse_quantity(raw)
    }

    /// Result of a rejected action: the error plus an `<Action>-Error` notice.
    fn rejection(env: &ActionEnvelope, err: TokenError) -> ApplyResult {
        warn!(
            "[vmtoken] {} from {} rejected: {}",
            env.action, env.caller, err
        );
        let mut notice =
            OutboundMessage::new(&env.caller).tag("Action", format!("{}-Error", env.action));
        if let Some(item_id) = &env.item_id {
            notice = notice.tag("TransactionId", item_id);
        }
        let notice = notice.tag("Error", err.code()).data(err.to_string());

        ApplyResult {
            messages: vec![notice],
            cache: CacheDelta::new(),
            error: Some(err),
        }
    }
}

impl TokenLedgerApi for TokenHandler {
    fn apply(&self, envelope: &ActionEnvelope) -> ApplyResult {
        TokenHandler::apply(self, envelope)
    }

    fn checkpoint(&self) -> Result<String, SnapshotError> {
        let state = self.state.read();
        let blob = algorithms::checkpoint(&state)?;
        debug!(
            "[vmtoken] Checkpoint of {}: {} bytes",
            state.ledger.info.id,
            blob.len()
        );
        Ok(blob)
    }

    fn restore(&self, blob: &str) -> Result<(), SnapshotError> {
        let restored = algorithms::restore(blob, self.kind)?;
        let mut state = self.state.write();
        *state = restored;
        info!(
            "[vmtoken] Restored {} with {} accounts, supply {}",
            state.ledger.info.id,
            state.ledger.balances.len(),
            state.ledger.total_supply
        );
        Ok(())
    }

    fn balance_of(&self, account: &str) -> Amount {
        let key = normalize(account)
            .map(AccountId::into_inner)
            .unwrap_or_else(|_| account.to_string());
        self.state.read().ledger.balance_of(&key)
    }

    fn total_supply(&self) -> Amount {
        self.state.read().ledger.total_supply.clone()
    }

    fn info(&self) -> TokenInfo {
        self.state.read().ledger.info.clone()
    }

    fn kind(&self) -> TokenKind {
        self.kind
    }
}
