//! # Randomized Accounting Checks
//!
//! Seeded random operation sequences, valid and invalid, against both
//! instance kinds. After every step the accounting invariants hold, and a
//! rejected step leaves the state exactly as it was.

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use vmtoken_ledger::{
        checkpoint, invariant_lock_keys_bound, invariant_locks_back_supply,
        invariant_no_zero_balances, invariant_supply_conservation, restore, ActionEnvelope,
        TokenHandler, TokenKind,
    };

    const STEPS: usize = 400;

    fn accounts() -> Vec<String> {
        let mut accounts: Vec<String> = ["alice", "bob", "carol"]
            .iter()
            .map(|n| account(n))
            .collect();
        accounts.push(FEE_RECIPIENT.to_string());
        accounts
    }

    fn quantity(rng: &mut StdRng) -> String {
        match rng.gen_range(0..10) {
            0 => "0".to_string(),
            1 => "-5".to_string(),
            2 => "1e3".to_string(),
            _ => rng.gen_range(1..2_000u32).to_string(),
        }
    }

    fn check_step(token: &TokenHandler, envelope: &ActionEnvelope) {
        let before = token.with_state(|s| s.clone());
        let result = token.apply(envelope);

        token.with_state(|s| {
            assert!(invariant_supply_conservation(&s.ledger), "{envelope:?}");
            assert!(invariant_no_zero_balances(&s.ledger), "{envelope:?}");
            assert!(invariant_locks_back_supply(s), "{envelope:?}");
            assert!(invariant_lock_keys_bound(s), "{envelope:?}");
            if !result.is_ok() {
                assert_eq!(*s, before, "rejected {envelope:?} changed state");
                assert!(result.cache.is_empty());
            }
        });
    }

    fn random_basic_step(rng: &mut StdRng, accounts: &[String]) -> ActionEnvelope {
        let from = &accounts[rng.gen_range(0..accounts.len())];
        let to = &accounts[rng.gen_range(0..accounts.len())];
        match rng.gen_range(0..3) {
            0 => mint(to, &quantity(rng)),
            _ => transfer(from, to, &quantity(rng)),
        }
    }

    fn random_bridge_step(rng: &mut StdRng, accounts: &[String], step: usize) -> ActionEnvelope {
        let from = &accounts[rng.gen_range(0..accounts.len())];
        let to = &accounts[rng.gen_range(0..accounts.len())];
        let chain = ["eth", "bsc"][rng.gen_range(0..2)];
        let token = [SOURCE_TOKEN, OTHER_SOURCE_TOKEN][rng.gen_range(0..2)];
        match rng.gen_range(0..4) {
            0 => {
                // occasionally replay an earlier tx id
                let tx = if step > 0 && rng.gen_bool(0.1) {
                    rng.gen_range(0..step)
                } else {
                    step
                };
                bridge_mint(to, &quantity(rng), chain, token, &format!("0x{tx:04x}"))
            }
            1 => burn(from, &quantity(rng), token),
            _ => transfer(from, to, &quantity(rng)),
        }
    }

    #[test]
    fn test_random_basic_sequences() {
        let accounts = accounts();
        for seed in [1u64, 7, 42] {
            let mut rng = StdRng::seed_from_u64(seed);
            let token = basic_token(&[("MaxSupply", "50000")]);
            for _ in 0..STEPS {
                let envelope = random_basic_step(&mut rng, &accounts);
                check_step(&token, &envelope);
            }
        }
    }

    #[test]
    fn test_random_bridge_sequences() {
        let accounts = accounts();
        for seed in [3u64, 11, 2024] {
            let mut rng = StdRng::seed_from_u64(seed);
            let token = bridge_token(&[]);
            for step in 0..STEPS {
                let envelope = random_bridge_step(&mut rng, &accounts, step);
                check_step(&token, &envelope);
            }

            // the final state survives a checkpoint round trip
            let state = token.with_state(|s| s.clone());
            let blob = checkpoint(&state).unwrap();
            let restored = restore(&blob, TokenKind::CrossChain).unwrap();
            assert_eq!(restored.ledger, state.ledger);
            assert_eq!(restored.bridge, state.bridge);
        }
    }
}
