//! Adversarial property-based test suite for Scavenge pools.
//!
//! Random interleavings of stake, withdraw, claim, exit and idle blocks are
//! thrown at whole pools. Each property runs 256 cases with proptest
//! shrinking to produce minimal failing sequences.
//!
//! Invariants tested:
//! - Pool total equals the sum of participant balances
//! - Reward-per-unit accumulator never decreases
//! - `earned` is a pure read
//! - Stake asset is conserved between players and custody
//! - Rewards paid never exceed funding, and match it up to dust when a
//!   participant is staked for the whole period
//! - Time locks hold until expiry or period end
//! - Consumable-entry pools burn exactly what they credit

use proptest::prelude::*;
use scav_core::types::{AccountId, Amount, PoolVariant};
use scav_pool::PoolEvent;
use scav_tests::helpers::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
enum Op {
    Stake(u8, Amount),
    Withdraw(u8, Amount),
    Claim(u8),
    Exit(u8),
    Wait(u64),
}

fn op_strategy(players: std::ops::Range<u8>) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (players.clone(), 1u128..50).prop_map(|(p, a)| Op::Stake(p, a)),
        2 => (players.clone(), 1u128..50).prop_map(|(p, a)| Op::Withdraw(p, a)),
        1 => players.clone().prop_map(Op::Claim),
        1 => players.prop_map(Op::Exit),
        2 => (1u64..10).prop_map(Op::Wait),
    ]
}

/// Apply `op` in a new block. Rejections are expected and ignored.
fn apply(fx: &Fixture, op: &Op) {
    fx.mine(1);
    let _ = match *op {
        Op::Stake(p, a) => fx.pool.stake(&player(p), a).map(drop),
        Op::Withdraw(p, a) => fx.pool.withdraw(&player(p), a).map(drop),
        Op::Claim(p) => fx.pool.get_reward(&player(p)).map(drop),
        Op::Exit(p) => fx.pool.exit(&player(p)).map(drop),
        Op::Wait(n) => {
            fx.mine(n);
            Ok(())
        }
    };
}

fn players() -> Vec<AccountId> {
    (0..3).map(player).collect()
}

/// Total reward asset paid out: players plus treasury.
fn rewards_paid(fx: &Fixture) -> Amount {
    players()
        .iter()
        .chain(std::iter::once(&TREASURY))
        .map(|a| fx.reward_balance(a))
        .sum()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Bookkeeping invariants hold after every operation.
    #[test]
    fn bookkeeping_invariants(ops in proptest::collection::vec(op_strategy(0..3), 1..60)) {
        let fx = Fixture::open();
        fx.schedule_and_fund(fx.height() + 5, 200, 20_000);
        let mut last_rpu = fx.pool.reward_per_unit().unwrap();

        for op in &ops {
            apply(&fx, op);

            let sum: Amount = players().iter().map(|a| fx.pool.balance_of(a)).sum();
            prop_assert_eq!(fx.pool.total_staked(), sum);

            let rpu = fx.pool.reward_per_unit().unwrap();
            prop_assert!(rpu >= last_rpu, "accumulator went backwards: {} -> {}", last_rpu, rpu);
            last_rpu = rpu;

            for a in players() {
                prop_assert_eq!(fx.pool.earned(&a).unwrap(), fx.pool.earned(&a).unwrap());
            }

            prop_assert_eq!(fx.tokens.total_supply(&lay()), 3 * PLAYER_FUNDS);
            prop_assert_eq!(fx.stake_balance(&POOL), fx.pool.total_staked());
        }
    }

    /// With someone staked for the whole period, everything funded is paid
    /// out once everyone leaves, minus truncation dust.
    #[test]
    fn rewards_conserved(
        ops in proptest::collection::vec(op_strategy(1..3), 0..40),
        rate in 1u128..500,
    ) {
        let fx = Fixture::open();
        let duration = 300;
        let funded = rate * duration as u128;
        let start = fx.height() + 5;
        fx.schedule_and_fund(start, duration, funded);
        fx.send(|p| p.stake(&player(0), 1));

        for op in &ops {
            apply(&fx, op);
            prop_assert!(rewards_paid(&fx) <= funded);
        }

        let finish = start + duration;
        if fx.height() < finish {
            fx.mine(finish - fx.height());
        }
        for a in players() {
            fx.send(|p| p.exit(&a));
        }

        let paid = rewards_paid(&fx);
        prop_assert!(paid <= funded);
        prop_assert!(
            funded - paid <= ops.len() as u128 + 4,
            "lost {} of {} to dust over {} ops", funded - paid, funded, ops.len()
        );
        prop_assert_eq!(fx.reward_balance(&POOL), funded - paid);
        prop_assert_eq!(fx.pool.total_staked(), 0);
    }

    /// A withdrawal from a time-locked pool only ever lands once the lock
    /// has expired or the reward period is over.
    #[test]
    fn time_lock_holds(
        ops in proptest::collection::vec(op_strategy(0..3), 1..50),
        lock in 1u64..40,
    ) {
        let fx = Fixture::time_locked(lock);
        let start = fx.height() + 5;
        fx.schedule_and_fund(start, 150, 15_000);
        fx.pool.drain_events();

        for op in &ops {
            let expiries: Vec<_> = players()
                .iter()
                .map(|a| fx.pool.account_info(a).unwrap().lock_expiry)
                .collect();
            apply(&fx, op);
            let now = fx.height();
            let period_over = now >= fx.pool.period_finish();

            for event in fx.pool.drain_events() {
                let account = match event {
                    PoolEvent::Withdrawn { account, .. } => account,
                    PoolEvent::RewardPaid { account, .. } => account,
                    _ => continue,
                };
                let idx = players().iter().position(|a| *a == account).unwrap();
                prop_assert!(
                    now >= expiries[idx] || period_over,
                    "released at {} before expiry {}", now, expiries[idx]
                );
            }
        }
    }

    /// Consumable-entry pools burn one unit per unit credited and never
    /// release stake.
    #[test]
    fn consumable_entry_burns_match_stake(
        ops in proptest::collection::vec(op_strategy(0..3), 1..50),
    ) {
        let fx = Fixture::consumable();
        fx.schedule_and_fund(fx.height(), 100, 10_000);

        for op in &ops {
            apply(&fx, op);
            prop_assert_eq!(fx.stake_balance(&BURN_POOL), fx.pool.total_staked());
            prop_assert_eq!(fx.stake_balance(&POOL), fx.pool.total_staked());
        }
        for a in players() {
            prop_assert_eq!(
                fx.stake_balance(&a) + 2 * fx.pool.balance_of(&a),
                PLAYER_FUNDS
            );
        }
    }

    /// The configured tax share is diverted from every payout.
    #[test]
    fn every_payout_is_taxed(ops in proptest::collection::vec(op_strategy(0..3), 1..60)) {
        let fx = Fixture::open();
        fx.schedule_and_fund(fx.height(), 200, 20_000);

        for op in &ops {
            apply(&fx, op);
        }
        for event in fx.pool.drain_events() {
            if let PoolEvent::RewardPaid { user_amount, tax_amount, .. } = event {
                let total = user_amount + tax_amount;
                prop_assert_eq!(tax_amount, total * 15 / 100);
            }
        }
        let user_paid: Amount = players().iter().map(|a| fx.reward_balance(a)).sum();
        prop_assert!(fx.reward_balance(&TREASURY) <= user_paid);
    }
}

#[test]
fn variant_fixtures_match_configuration() {
    assert_eq!(Fixture::open().pool.config().variant, PoolVariant::Open);
    assert_eq!(
        Fixture::time_locked(5).pool.config().variant,
        PoolVariant::TimeLocked
    );
    assert_eq!(
        Fixture::consumable().pool.config().burn_sink,
        Some(BURN_POOL)
    );
}
