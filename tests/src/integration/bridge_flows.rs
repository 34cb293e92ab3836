//! # Bridge Flows
//!
//! Cross-chain mint and burn on a bridge instance: fee split, replay,
//! chain binding, lock backing and the burn-processor notice.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use vmtoken_ledger::{
        balance_key, invariant_lock_keys_bound, invariant_locks_back_supply,
        invariant_supply_conservation, normalize, Amount, CacheInfo, LockKey, TokenError,
        TokenLedgerApi, INFO_KEY, TOTAL_SUPPLY_KEY,
    };

    fn amount(n: u64) -> Amount {
        Amount::from(n)
    }

    fn locked(token: &vmtoken_ledger::TokenHandler, chain: &str, source: &str) -> Amount {
        let key = LockKey::new(chain, normalize(source).unwrap());
        token.with_state(|s| s.bridge.as_ref().unwrap().locked(&key))
    }

    fn assert_accounting(token: &vmtoken_ledger::TokenHandler) {
        token.with_state(|s| {
            assert!(invariant_supply_conservation(&s.ledger));
            assert!(invariant_locks_back_supply(s));
            assert!(invariant_lock_keys_bound(s));
        });
    }

    // =============================================================================
    // BURN FEE SPLIT
    // =============================================================================

    #[test]
    fn test_burn_fee_split() {
        let token = bridge_token(&[]);
        let alice = account("alice");

        let minted = token.apply(&bridge_mint(&alice, "10000", "eth", SOURCE_TOKEN, "0xabc"));
        assert!(minted.is_ok(), "{:?}", minted.error);
        assert_eq!(locked(&token, "eth", SOURCE_TOKEN), amount(10000));

        let burned = token.apply(&burn(&alice, "1000", SOURCE_TOKEN));
        assert!(burned.is_ok(), "{:?}", burned.error);

        assert_eq!(token.balance_of(&alice), amount(9000));
        assert_eq!(token.balance_of(FEE_RECIPIENT), amount(100));
        assert_eq!(token.total_supply(), amount(9100));
        assert_eq!(locked(&token, "eth", SOURCE_TOKEN), amount(9100));
        assert_accounting(&token);

        let notice = &burned.messages[0];
        assert_eq!(notice.target, BURN_PROCESSOR);
        assert_eq!(notice.get_tag("Action"), Some("Burn-Notice"));
        assert_eq!(notice.get_tag("Quantity"), Some("900"));
        assert_eq!(notice.get_tag("Fee"), Some("100"));
        assert_eq!(notice.get_tag("FeeRecipient"), Some(FEE_RECIPIENT));
        assert_eq!(notice.get_tag("TargetChainType"), Some("eth"));
        assert_eq!(notice.get_tag("TargetTokenId"), Some(SOURCE_TOKEN));
        assert_eq!(notice.get_tag("X-Recipient"), Some(alice.as_str()));
        assert_eq!(notice.get_tag("WrappedTokenId"), Some("token-under-test"));

        let cache = &burned.cache;
        assert_eq!(cache[&balance_key(&alice)], "9000");
        assert_eq!(cache[&balance_key(FEE_RECIPIENT)], "100");
        assert_eq!(cache[TOTAL_SUPPLY_KEY], "9100");
        let info: CacheInfo = serde_json::from_str(&cache[INFO_KEY]).unwrap();
        assert_eq!(
            info.source_lock_amounts.as_deref(),
            Some(format!(r#"{{"eth:{SOURCE_TOKEN}":"9100"}}"#).as_str())
        );
    }

    #[test]
    fn test_burn_to_external_recipient() {
        let token = bridge_token(&[]);
        let alice = account("alice");
        token.apply(&bridge_mint(&alice, "500", "bsc", OTHER_SOURCE_TOKEN, "0x1"));

        let burned = token.apply(
            &burn(&alice, "200", OTHER_SOURCE_TOKEN).with_param("Recipient", SOURCE_TOKEN_RAW),
        );
        assert!(burned.is_ok());
        // zero fee on bsc: everything leaves circulation
        assert_eq!(token.total_supply(), amount(300));
        assert_eq!(burned.messages[0].get_tag("X-Recipient"), Some(SOURCE_TOKEN));
        assert_eq!(burned.messages[0].get_tag("Fee"), Some("0"));
        assert_accounting(&token);
    }

    #[test]
    fn test_burn_rejections_leave_state_unchanged() {
        let token = bridge_token(&[]);
        let alice = account("alice");
        let bob = account("bob");
        token.apply(&bridge_mint(&alice, "1000", "eth", SOURCE_TOKEN, "0x1"));
        let before = token.with_state(|s| s.clone());

        let reject = |envelope: vmtoken_ledger::ActionEnvelope| {
            let result = token.apply(&envelope);
            assert!(result.cache.is_empty());
            assert_eq!(result.messages[0].get_tag("Action"), Some("Burn-Error"));
            result.error.expect("burn should be rejected")
        };

        // unknown target token
        assert!(matches!(
            reject(burn(&alice, "500", OTHER_SOURCE_TOKEN)),
            TokenError::IncorrectTargetTokenId(_)
        ));
        // amount below the fee
        assert!(matches!(
            reject(burn(&alice, "99", SOURCE_TOKEN)),
            TokenError::IncorrectQuantity { .. }
        ));
        // net 1001 exceeds the lock
        assert!(matches!(
            reject(burn(&alice, "1101", SOURCE_TOKEN)),
            TokenError::InsufficientLockAmount { .. }
        ));
        // bob holds nothing
        assert!(matches!(
            reject(burn(&bob, "500", SOURCE_TOKEN)),
            TokenError::InsufficientBalance { .. }
        ));
        assert!(matches!(
            reject(burn(&alice, "not-a-number", SOURCE_TOKEN)),
            TokenError::InvalidQuantityFormat(_)
        ));
        assert!(matches!(
            reject(
                vmtoken_ledger::ActionEnvelope::new("Burn", alice.as_str())
                    .with_param("Quantity", "500")
            ),
            TokenError::MissingTargetTokenId
        ));

        assert_eq!(token.with_state(|s| s.clone()), before);
    }

    #[test]
    fn test_burn_without_configured_fee() {
        let token = bridge_token(&[]);
        let alice = account("alice");
        token.apply(&bridge_mint(&alice, "50", "polygon", SOURCE_TOKEN, "0x1"));

        let result = token.apply(&burn(&alice, "10", SOURCE_TOKEN));
        assert!(matches!(result.error, Some(TokenError::MissingBurnFee(_))));
        assert_eq!(token.total_supply(), amount(50));
    }

    /// Bridge instance restored from a blob that binds `SOURCE_TOKEN` to eth
    /// and gives alice 1000, with the given supply and lock fields.
    fn restored_bridge(total_supply: &str, locks: &str) -> vmtoken_ledger::TokenHandler {
        let token = bridge_token(&[]);
        let alice = account("alice");
        token
            .restore(&format!(
                r#"{{"id":"token-under-test","owner":"{CREATOR}","mintOwner":"{CREATOR}","totalSupply":"{total_supply}","balances":{{"{alice}":"1000"}},"sourceTokenChains":{{"{SOURCE_TOKEN}":"eth"}},"sourceLockAmounts":{locks},"burnFees":{{"eth":"0"}},"feeRecipient":"{FEE_RECIPIENT}","burnProcessor":"{BURN_PROCESSOR}"}}"#
            ))
            .unwrap();
        token
    }

    #[test]
    fn test_burn_without_lock_entry() {
        let token = restored_bridge("1000", "{}");
        let alice = account("alice");
        let before = token.with_state(|s| s.clone());

        let result = token.apply(&burn(&alice, "500", SOURCE_TOKEN));
        assert!(matches!(result.error, Some(TokenError::LockAmountEmpty(_))));
        assert_eq!(token.with_state(|s| s.clone()), before);
    }

    #[test]
    fn test_burn_after_inconsistent_restore_is_rejected() {
        let token = restored_bridge("0", &format!(r#"{{"eth:{SOURCE_TOKEN}":"1000"}}"#));
        let alice = account("alice");
        let before = token.with_state(|s| s.clone());

        let result = token.apply(&burn(&alice, "500", SOURCE_TOKEN));
        assert_eq!(
            result.error.as_ref().map(TokenError::code),
            Some("err_insufficient_total_supply")
        );
        assert_eq!(token.with_state(|s| s.clone()), before);
    }

    // =============================================================================
    // REPLAY AND BINDING
    // =============================================================================

    #[test]
    fn test_replayed_bridge_tx_rejected() {
        let token = bridge_token(&[]);
        let alice = account("alice");

        assert!(token
            .apply(&bridge_mint(&alice, "10", "eth", SOURCE_TOKEN, "0xdead"))
            .is_ok());
        let before = token.with_state(|s| s.clone());

        let replay = token.apply(&bridge_mint(&alice, "10", "eth", SOURCE_TOKEN, "0xdead"));
        assert!(matches!(replay.error, Some(TokenError::RepeatMint(_))));
        assert_eq!(token.with_state(|s| s.clone()), before);
    }

    #[test]
    fn test_source_token_binding_is_immutable() {
        let token = bridge_token(&[]);
        let alice = account("alice");

        assert!(token
            .apply(&bridge_mint(&alice, "10", "ethereum", SOURCE_TOKEN_RAW, "0x1"))
            .is_ok());
        let result = token.apply(&bridge_mint(&alice, "10", "bsc", SOURCE_TOKEN, "0x2"));
        assert!(matches!(
            result.error,
            Some(TokenError::IncorrectSourceChainType { .. })
        ));
        assert_eq!(token.total_supply(), amount(10));

        // the rejected tx id was not consumed
        assert!(token
            .apply(&bridge_mint(&alice, "10", "ethereum", SOURCE_TOKEN, "0x2"))
            .is_ok());
        token.with_state(|s| {
            let bridge = s.bridge.as_ref().unwrap();
            assert_eq!(bridge.chain_of(SOURCE_TOKEN), Some("ethereum"));
            assert_eq!(bridge.minted_records.len(), 2);
        });
        assert_accounting(&token);
    }

    #[test]
    fn test_cap_failure_does_not_bind() {
        let token = bridge_token(&[("MaxSupply", "100")]);
        let alice = account("alice");

        let result = token.apply(&bridge_mint(&alice, "101", "eth", SOURCE_TOKEN, "0x1"));
        assert!(matches!(
            result.error,
            Some(TokenError::InsufficientMaxSupply { .. })
        ));
        token.with_state(|s| {
            let bridge = s.bridge.as_ref().unwrap();
            assert!(bridge.source_token_chains.is_empty());
            assert!(bridge.minted_records.is_empty());
        });

        assert!(token
            .apply(&bridge_mint(&alice, "100", "bsc", SOURCE_TOKEN, "0x1"))
            .is_ok());
    }

    #[test]
    fn test_mint_requires_bridge_params() {
        let token = bridge_token(&[]);
        let alice = account("alice");

        let missing_hash = token.apply(&mint(&alice, "10"));
        assert!(matches!(
            missing_hash.error,
            Some(TokenError::MissingMintTxHash)
        ));

        let missing_chain = token.apply(&mint(&alice, "10").with_param("X-MintTxHash", "0x1"));
        assert!(matches!(
            missing_chain.error,
            Some(TokenError::MissingSourceChain)
        ));
        assert_eq!(token.total_supply(), amount(0));
    }

    #[test]
    fn test_burn_fee_credit_keeps_conservation_across_transfers() {
        let token = bridge_token(&[]);
        let (alice, bob) = (account("alice"), account("bob"));

        token.apply(&bridge_mint(&alice, "5000", "eth", SOURCE_TOKEN, "0x1"));
        token.apply(&transfer(&alice, &bob, "2500"));
        token.apply(&burn(&bob, "2500", SOURCE_TOKEN));
        token.apply(&transfer(FEE_RECIPIENT, &alice, "100"));

        assert_eq!(token.balance_of(&bob), amount(0));
        assert_eq!(token.balance_of(FEE_RECIPIENT), amount(0));
        assert_eq!(token.balance_of(&alice), amount(2600));
        assert_eq!(token.total_supply(), amount(2600));
        assert_accounting(&token);
    }
}
