//! # Ledger Flows
//!
//! Basic-instance operations driven through the handler, with cache deltas
//! forwarded to an in-memory sink.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use vmtoken_ledger::{
        balance_key, full_projection, ActionEnvelope, Amount, CacheInfo, CacheSink,
        InMemoryCacheSink, TokenError, TokenLedgerApi, INFO_KEY, TOTAL_SUPPLY_KEY,
    };

    fn amount(n: u64) -> Amount {
        Amount::from(n)
    }

    // =============================================================================
    // TRANSFERS
    // =============================================================================

    #[test]
    fn test_transfer_moves_exact_amount() {
        let token = basic_token(&[]);
        let alice = account("alice");
        let bob = account("bob");

        assert!(token.apply(&mint(&alice, "100")).is_ok());
        let result = token.apply(&transfer(&alice, &bob, "30").with_item_id("tx-42"));
        assert!(result.is_ok());

        assert_eq!(token.balance_of(&alice), amount(70));
        assert_eq!(token.balance_of(&bob), amount(30));
        assert_eq!(token.total_supply(), amount(100));

        let debit = result.messages_to(&alice).next().unwrap();
        assert_eq!(debit.get_tag("Action"), Some("Debit-Notice"));
        assert_eq!(debit.get_tag("TransactionId"), Some("tx-42"));
        let credit = result.messages_to(&bob).next().unwrap();
        assert_eq!(credit.get_tag("Action"), Some("Credit-Notice"));
        assert_eq!(credit.get_tag("Sender"), Some(alice.as_str()));
    }

    #[test]
    fn test_transfer_forwards_x_params() {
        let token = basic_token(&[]);
        let alice = account("alice");
        let bob = account("bob");
        token.apply(&mint(&alice, "10"));

        let result = token.apply(
            &transfer(&alice, &bob, "1")
                .with_param("X-Memo", "rent")
                .with_param("Note", "dropped"),
        );
        for message in &result.messages {
            assert_eq!(message.get_tag("X-Memo"), Some("rent"));
            assert_eq!(message.get_tag("Note"), None);
        }
    }

    #[test]
    fn test_overdraft_leaves_state_unchanged() {
        let token = basic_token(&[]);
        let alice = account("alice");
        let bob = account("bob");
        token.apply(&mint(&alice, "50"));
        let before = token.with_state(|s| s.clone());

        let result = token.apply(&transfer(&alice, &bob, "51"));
        assert!(matches!(
            result.error,
            Some(TokenError::InsufficientBalance { .. })
        ));
        assert!(result.cache.is_empty());
        assert_eq!(token.with_state(|s| s.clone()), before);

        let notice = &result.messages[0];
        assert_eq!(notice.target, alice);
        assert_eq!(notice.get_tag("Action"), Some("Transfer-Error"));
    }

    #[test]
    fn test_evm_addresses_are_canonicalized() {
        let token = basic_token(&[]);
        token.apply(&mint(SOURCE_TOKEN_RAW, "5"));

        assert_eq!(token.balance_of(SOURCE_TOKEN), amount(5));
        assert_eq!(token.balance_of(SOURCE_TOKEN_RAW), amount(5));
        token.with_state(|s| {
            assert!(s.ledger.balances.contains_key(SOURCE_TOKEN));
            assert!(!s.ledger.balances.contains_key(SOURCE_TOKEN_RAW));
        });
    }

    // =============================================================================
    // SUPPLY
    // =============================================================================

    #[test]
    fn test_cap_rejects_overflowing_mint() {
        let token = basic_token(&[("MaxSupply", "1000")]);
        let alice = account("alice");

        assert!(token.apply(&mint(&alice, "600")).is_ok());
        let result = token.apply(&mint(&alice, "500"));
        assert!(matches!(
            result.error,
            Some(TokenError::InsufficientMaxSupply { .. })
        ));
        assert_eq!(token.total_supply(), amount(600));
        assert!(token.apply(&mint(&alice, "400")).is_ok());
        assert_eq!(token.total_supply(), amount(1000));
    }

    #[test]
    fn test_only_mint_owner_mints() {
        let token = basic_token(&[]);
        let alice = account("alice");
        let result = token.apply(
            &ActionEnvelope::new("Mint", alice.as_str())
                .with_param("Recipient", alice.as_str())
                .with_param("Quantity", "1"),
        );
        assert_eq!(result.error.as_ref().map(|e| e.code()), Some("err_incorrect_owner"));
        assert_eq!(token.total_supply(), amount(0));
    }

    #[test]
    fn test_amounts_beyond_u128() {
        let token = basic_token(&[]);
        let alice = account("alice");
        let huge = "340282366920938463463374607431768211456000";
        assert!(token.apply(&mint(&alice, huge)).is_ok());
        assert!(token.apply(&mint(&alice, huge)).is_ok());
        assert_eq!(
            token.total_supply().to_string(),
            "680564733841876926926749214863536422912000"
        );
    }

    // =============================================================================
    // SET-PARAMS
    // =============================================================================

    #[test]
    fn test_set_params_hands_over_ownership() {
        let token = basic_token(&[]);
        let alice = account("alice");

        let result = token.apply(
            &ActionEnvelope::new("Set-Params", CREATOR)
                .with_param("Owner", alice.as_str())
                .with_param("MintOwner", alice.as_str())
                .with_param("Ticker", "NEW"),
        );
        assert!(result.is_ok());
        assert_eq!(result.cache.keys().collect::<Vec<_>>(), vec![INFO_KEY]);

        // old owner lost both roles
        assert!(!token.apply(&mint(&alice, "1")).is_ok());
        let minted = token.apply(
            &ActionEnvelope::new("Mint", alice.as_str())
                .with_param("Recipient", alice.as_str())
                .with_param("Quantity", "1"),
        );
        assert!(minted.is_ok());
        assert_eq!(minted.messages[0].get_tag("Ticker"), Some("NEW"));
    }

    #[test]
    fn test_set_params_all_or_nothing() {
        let token = basic_token(&[]);
        let before = token.info();

        let result = token.apply(
            &ActionEnvelope::new("Set-Params", CREATOR)
                .with_param("Name", "Renamed")
                .with_param("MaxSupply", "lots"),
        );
        assert!(matches!(result.error, Some(TokenError::InvalidMaxSupply(_))));
        assert_eq!(token.info(), before);
    }

    // =============================================================================
    // CACHE PROJECTION
    // =============================================================================

    #[tokio::test]
    async fn test_sink_converges_to_full_projection() {
        let token = basic_token(&[]);
        let sink = InMemoryCacheSink::new();
        let id = token.id();
        let (alice, bob, carol) = (account("alice"), account("bob"), account("carol"));

        let steps = vec![
            mint(&alice, "100"),
            transfer(&alice, &bob, "40"),
            query("Info", &carol),
            transfer(&bob, &carol, "40"),
            mint(&carol, "5"),
            query("Balance", &alice),
        ];
        for step in &steps {
            let result = token.apply(step);
            assert!(result.is_ok(), "{} failed: {:?}", step.action, result.error);
            sink.apply(&id, &result.cache).await.unwrap();
        }

        let cached = sink.snapshot(&id);
        let expected = token.with_state(full_projection);
        for (key, value) in &expected {
            assert_eq!(cached.get(key), Some(value), "{key}");
        }
        // bob was emptied: pruned from state, projected as zero
        assert_eq!(cached[&balance_key(&bob)], "0");
        assert!(!expected.contains_key(&balance_key(&bob)));
        assert_eq!(cached[TOTAL_SUPPLY_KEY], "105");
    }

    #[test]
    fn test_bootstrap_happens_once() {
        let token = basic_token(&[]);
        let alice = account("alice");
        token.apply(&mint(&alice, "7"));

        let first = token.apply(&query("Total-Supply", &alice));
        assert_eq!(first.messages[0].data.as_deref(), Some("7"));
        assert!(first.cache.contains_key(&balance_key(&alice)));
        assert!(first.cache.contains_key(INFO_KEY));

        let second = token.apply(&query("TotalSupply", &alice));
        assert!(second.cache.is_empty());
    }

    #[test]
    fn test_info_entry_is_pascal_case_json() {
        let token = basic_token(&[("MaxSupply", "-5")]);
        let result = token.apply(&query("Info", CREATOR));
        let info: CacheInfo = serde_json::from_str(&result.cache[INFO_KEY]).unwrap();
        assert_eq!(info.ticker, "WTST");
        assert_eq!(info.max_supply, "0");
        assert_eq!(info.burn_fees, None);

        let raw: serde_json::Value = serde_json::from_str(&result.cache[INFO_KEY]).unwrap();
        assert_eq!(raw["MintOwner"], CREATOR);
    }

    #[test]
    fn test_unknown_action_rejected() {
        let token = basic_token(&[]);
        let result = token.apply(&query("Burn", CREATOR).with_item_id("tx-9"));
        assert!(matches!(result.error, Some(TokenError::UnsupportedAction(_))));
        assert_eq!(result.messages[0].get_tag("Action"), Some("Burn-Error"));
        assert_eq!(result.messages[0].get_tag("TransactionId"), Some("tx-9"));
    }
}
