//! Property-based tests for delegation fee invariants.
//!
//! Properties tested:
//! 1. A fee change never alters the fee of the epoch it was requested in.
//! 2. The new fee applies from the following epoch on.
//! 3. Changes inside the cooldown are rejected without effect.
//! 4. Fees above 100 % are rejected.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        trv1_stake_rewards::{
            commission::CommissionSchedule, EpochClock, StakeRewardsConfig, StakeRewardsError,
        },
    };

    const POOL: u64 = 1;

    fn setup(default_fee_bps: u16) -> (CommissionSchedule, EpochClock, i64) {
        let config = StakeRewardsConfig {
            default_fee_bps,
            ..StakeRewardsConfig::default()
        };
        (
            CommissionSchedule::new(config.default_fee_bps, config.fee_change_cooldown_secs),
            EpochClock::from_config(&config),
            config.fee_change_cooldown_secs,
        )
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1-2. Deferral
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn fee_change_applies_next_epoch(
            default_fee in 0..=10_000u16,
            new_fee in 0..=10_000u16,
            epoch in 1..=10_000u64,
            offset in 0..604_800i64,
        ) {
            let (mut schedule, clock, _) = setup(default_fee);
            let now = clock.epoch_start(epoch) + offset;
            let now_epoch = clock.epoch_of(now);
            prop_assert_eq!(now_epoch, epoch);

            let entry = schedule.set_fee(POOL, new_fee, now, now_epoch).unwrap();

            // ── INVARIANT: the requesting epoch keeps its fee ──
            prop_assert_eq!(schedule.effective_fee(POOL, epoch), default_fee);
            prop_assert_eq!(schedule.effective_fee(POOL, epoch - 1), default_fee);
            // ── INVARIANT: the new fee holds from the next epoch on ──
            prop_assert_eq!(entry.effective_epoch, epoch + 1);
            prop_assert_eq!(schedule.effective_fee(POOL, epoch + 1), new_fee);
            prop_assert_eq!(schedule.effective_fee(POOL, epoch + 100), new_fee);

            let state = schedule.fee_state(POOL, epoch);
            prop_assert_eq!(state.current_fee_bps, default_fee);
            prop_assert_eq!(state.pending_fee_bps, Some(new_fee));
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Cooldown
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn cooldown_blocks_changes(
            first_fee in 0..=10_000u16,
            second_fee in 0..=10_000u16,
            start in 0..=100_000_000i64,
            wait in 0..=4_000_000i64,
        ) {
            let (mut schedule, clock, cooldown) = setup(0);
            schedule.set_fee(POOL, first_fee, start, clock.epoch_of(start)).unwrap();
            let before = schedule.clone();

            let later = start + wait;
            let result = schedule.set_fee(POOL, second_fee, later, clock.epoch_of(later));

            if wait < cooldown {
                // ── INVARIANT: rejected changes leave the schedule alone ──
                prop_assert_eq!(
                    result,
                    Err(StakeRewardsError::FeeChangeCooldownActive {
                        last_change: start,
                        ready_at: start + cooldown,
                    })
                );
                prop_assert_eq!(schedule, before);
            } else {
                prop_assert!(result.is_ok());
                let next = clock.epoch_of(later) + 1;
                prop_assert_eq!(schedule.effective_fee(POOL, next), second_fee);
            }
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 4. Bounds
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn fee_above_full_rejected(fee in 10_001..=u16::MAX) {
            let (mut schedule, _, _) = setup(0);
            prop_assert_eq!(
                schedule.set_fee(POOL, fee, 0, 0),
                Err(StakeRewardsError::InvalidFeeBps { fee_bps: fee })
            );
            prop_assert!(schedule.schedule(POOL).map_or(true, |s| s.entries().is_empty()));
        }
    }
}
