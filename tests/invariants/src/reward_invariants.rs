//! Property-based tests for reward distribution invariants.
//!
//! Properties tested:
//! 1. Payouts for an epoch never exceed the posted reward, and lose at most
//!    a few units to truncation.
//! 2. Stake that joins later in an epoch never earns more.
//! 3. An epoch can be claimed once; the vault only pays once.
//! 4. Time-weighted stake integrals are additive over adjacent ranges.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        solana_pubkey::Pubkey,
        trv1_stake_rewards::{
            accumulator::CheckpointSeries,
            memory::{InMemoryStakeLedger, InMemorySubjectRegistry, ManualClock},
            StakeRewards, StakeRewardsConfig, StakeRewardsError, Subject,
        },
    };

    const POOL: u64 = 1;
    const EPOCH: u64 = 10;
    const VAULT: u64 = u64::MAX / 2;

    type Engine = StakeRewards<InMemoryStakeLedger, InMemorySubjectRegistry, ManualClock>;

    fn owner() -> Pubkey {
        Pubkey::new_from_array([1; 32])
    }

    fn delegator(i: usize) -> Pubkey {
        let mut bytes = [0u8; 32];
        bytes[0] = 0xd0;
        bytes[1..9].copy_from_slice(&(i as u64).to_le_bytes());
        Pubkey::new_from_array(bytes)
    }

    fn engine(fee_bps: u16) -> Engine {
        let config = StakeRewardsConfig {
            default_fee_bps: fee_bps,
            ..StakeRewardsConfig::default()
        };
        let mut registry = InMemorySubjectRegistry::new();
        registry.register(POOL, owner(), u64::MAX);
        let start = config.epoch_offset_secs
            + EPOCH as i64 * config.epoch_length_secs;
        StakeRewards::new(
            config,
            InMemoryStakeLedger::with_vault(VAULT),
            registry,
            ManualClock::new(start),
        )
        .unwrap()
    }

    fn deposit(engine: &mut Engine, subject: Subject, participant: &Pubkey, amount: u64) {
        engine
            .ledger_mut()
            .credit(&subject, participant, amount)
            .unwrap();
        engine.did_deposit(&subject, participant, amount).unwrap();
    }

    /// Move the clock to `offset` seconds into `EPOCH`.
    fn warp(engine: &Engine, offset: i64) {
        let start = engine.epoch_clock().epoch_start(EPOCH);
        engine.clock().set(start + offset);
    }

    fn close_epoch(engine: &Engine) {
        let end = engine.epoch_clock().epoch_end(EPOCH);
        engine.clock().set(end);
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Conservation
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn payouts_never_exceed_reward(
            own in 1..=1_000_000u64,
            joins in prop::collection::vec((1..=1_000_000u64, 0..604_800i64), 1..6),
            amount in 0..=1_000_000_000u64,
            fee_bps in 0..=10_000u16,
        ) {
            let mut e = engine(fee_bps);
            deposit(&mut e, Subject::pool(POOL), &owner(), own);

            let mut joins = joins;
            joins.sort_by_key(|(_, offset)| *offset);
            for (i, (stake, offset)) in joins.iter().enumerate() {
                warp(&e, *offset);
                deposit(&mut e, Subject::delegator(POOL), &delegator(i), *stake);
            }
            close_epoch(&e);

            if amount == 0 {
                prop_assert!(matches!(
                    e.reward(&Subject::pool(POOL), EPOCH, 0),
                    Err(StakeRewardsError::ZeroAmount { .. })
                ), "reward of 0 must fail with ZeroAmount");
                return Ok(());
            }
            e.reward(&Subject::pool(POOL), EPOCH, amount).unwrap();

            let owner_share = e.available_reward(&Subject::pool(POOL), EPOCH, &owner());
            let delegator_shares: u64 = (0..joins.len())
                .map(|i| e.available_reward(&Subject::delegator(POOL), EPOCH, &delegator(i)))
                .sum();
            let paid = owner_share + delegator_shares;

            // ── INVARIANT: payouts ≤ reward ──
            prop_assert!(paid <= amount, "paid {} of {}", paid, amount);
            // ── INVARIANT: truncation dust bounded by the number of divisions ──
            prop_assert!(
                amount - paid <= joins.len() as u64 + 2,
                "lost {} of {}",
                amount - paid,
                amount
            );
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Time weighting
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn later_stake_never_earns_more(
            stake in 1..=1_000_000u64,
            early in 0..604_800i64,
            delay in 0..604_800i64,
            amount in 1..=1_000_000_000u64,
        ) {
            let late = (early + delay).min(604_799);
            let mut e = engine(0);
            deposit(&mut e, Subject::pool(POOL), &owner(), stake);
            warp(&e, early);
            deposit(&mut e, Subject::delegator(POOL), &delegator(0), stake);
            warp(&e, late);
            deposit(&mut e, Subject::delegator(POOL), &delegator(1), stake);
            close_epoch(&e);
            e.reward(&Subject::pool(POOL), EPOCH, amount).unwrap();

            let first = e.available_reward(&Subject::delegator(POOL), EPOCH, &delegator(0));
            let second = e.available_reward(&Subject::delegator(POOL), EPOCH, &delegator(1));
            let own = e.available_reward(&Subject::pool(POOL), EPOCH, &owner());

            // ── INVARIANT: earlier equal stake earns at least as much ──
            prop_assert!(second <= first);
            prop_assert!(first <= own);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Claim idempotence
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn each_epoch_pays_once(
            own in 1..=1_000_000u64,
            delegated in 1..=1_000_000u64,
            amount in 1..=1_000_000_000u64,
            fee_bps in 0..=10_000u16,
            owner_first in prop::bool::ANY,
        ) {
            let mut e = engine(fee_bps);
            deposit(&mut e, Subject::pool(POOL), &owner(), own);
            deposit(&mut e, Subject::delegator(POOL), &delegator(0), delegated);
            close_epoch(&e);
            e.reward(&Subject::pool(POOL), EPOCH, amount).unwrap();

            let mut claims = vec![
                (Subject::pool(POOL), owner()),
                (Subject::delegator(POOL), delegator(0)),
            ];
            if !owner_first {
                claims.reverse();
            }

            let mut paid = 0u64;
            for (subject, participant) in &claims {
                let available = e.available_reward(subject, EPOCH, participant);
                match e.claim_rewards(subject, participant, &[EPOCH]) {
                    Ok(claimed) => {
                        prop_assert_eq!(claimed, available);
                        paid += claimed;
                    }
                    Err(err) => {
                        prop_assert_eq!(available, 0);
                        let is_zero_amount = matches!(err, StakeRewardsError::ZeroAmount { .. });
                        prop_assert!(is_zero_amount);
                        continue;
                    }
                }

                // ── INVARIANT: a second claim is rejected and pays nothing ──
                prop_assert_eq!(
                    e.claim_rewards(subject, participant, &[EPOCH]),
                    Err(StakeRewardsError::AlreadyClaimed { epoch: EPOCH })
                );
                prop_assert_eq!(e.available_reward(subject, EPOCH, participant), 0);
            }

            prop_assert_eq!(e.ledger().vault_balance(), VAULT - paid);
            prop_assert!(paid <= amount);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Integral additivity
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn weight_is_additive(
            steps in prop::collection::vec((1..=100_000i64, 0..=1_000_000u64), 1..20),
            cuts in prop::collection::vec(0..=2_000_000i64, 3),
        ) {
            let mut series = CheckpointSeries::new();
            let mut ts = 0i64;
            for (gap, amount) in steps {
                ts += gap;
                series.record(ts, 0, amount);
            }

            let mut cuts = cuts;
            cuts.sort_unstable();
            let (a, b, c) = (cuts[0], cuts[1], cuts[2]);

            // ── INVARIANT: W(a, b) + W(b, c) = W(a, c) ──
            prop_assert_eq!(
                series.weight_between(a, b) + series.weight_between(b, c),
                series.weight_between(a, c)
            );
            // ── INVARIANT: weight bounded by peak stake × duration ──
            let peak = series.checkpoints().iter().map(|cp| cp.amount).max().unwrap_or(0);
            prop_assert!(series.weight_between(a, c) <= peak as u128 * (c - a) as u128);
        }
    }
}
