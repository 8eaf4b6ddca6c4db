//! Property-based tests for allocation and slashing invariants.
//!
//! Properties tested:
//! 1. Allocate/unallocate never change a class total.
//! 2. Managed stake never exceeds the pool threshold after an allocation.
//! 3. Slash losses never exceed allocated stake and never touch reserves.
//! 4. A failed operation leaves the allocation unchanged.

#[cfg(test)]
mod tests {
    use {
        proptest::prelude::*,
        trv1_stake_rewards::{
            allocator::StakeAllocator, slashing::compute_losses, AllocationState, Subject,
            SubjectType,
        },
    };

    const POOL: u64 = 1;

    fn allocator(own: u64, delegated: u64, max: u64) -> StakeAllocator {
        let mut a = StakeAllocator::new();
        if own > 0 {
            a.deposit(&Subject::pool(POOL), own, max).unwrap();
        }
        if delegated > 0 {
            a.deposit(&Subject::delegator(POOL), delegated, max).unwrap();
        }
        a
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 1. Allocation moves conserve class totals
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn allocation_moves_conserve_totals(
            own in 0..=1_000_000u64,
            delegated in 0..=1_000_000u64,
            max in 0..=2_000_000u64,
            ops in prop::collection::vec((prop::bool::ANY, prop::bool::ANY, 1..=500_000u64), 1..20),
        ) {
            let mut a = allocator(own, delegated, max);
            let totals = (a.state(POOL).total(SubjectType::Pool), a.state(POOL).total(SubjectType::Delegator));

            for (is_delegator, allocate, amount) in ops {
                let subject = if is_delegator { Subject::delegator(POOL) } else { Subject::pool(POOL) };
                let before = a.state(POOL);
                let result = if allocate {
                    a.allocate(&subject, amount, max)
                } else {
                    a.unallocate(&subject, amount)
                };

                // ── INVARIANT: failures change nothing ──
                if result.is_err() {
                    prop_assert_eq!(a.state(POOL), before);
                }
                // ── INVARIANT: successful allocations respect the threshold ──
                if allocate && result.is_ok() {
                    prop_assert!(a.managed_stake(POOL) <= max);
                }
            }

            // ── INVARIANT: class totals untouched ──
            let state = a.state(POOL);
            prop_assert_eq!(state.total(SubjectType::Pool), totals.0);
            prop_assert_eq!(state.total(SubjectType::Delegator), totals.1);
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 2. Deposits never overfill the pool
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn deposits_respect_threshold(
            deposits in prop::collection::vec((prop::bool::ANY, 1..=1_000_000u64), 1..20),
            max in 0..=5_000_000u64,
        ) {
            let mut a = StakeAllocator::new();
            let mut deposited = 0u64;
            for (is_delegator, amount) in deposits {
                let subject = if is_delegator { Subject::delegator(POOL) } else { Subject::pool(POOL) };
                a.deposit(&subject, amount, max).unwrap();
                deposited += amount;

                prop_assert!(a.managed_stake(POOL) <= max);
            }
            let state = a.state(POOL);
            prop_assert_eq!(
                state.total(SubjectType::Pool) + state.total(SubjectType::Delegator),
                deposited
            );
            // ── INVARIANT: reserve only holds what did not fit ──
            prop_assert_eq!(a.managed_stake(POOL), deposited.min(max));
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // 3. Slash bounds
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        #[test]
        fn slash_within_allocated_stake(
            own_allocated in 0..=10_000_000_000u64,
            own_unallocated in 0..=10_000_000_000u64,
            delegated_allocated in 0..=10_000_000_000u64,
            delegated_unallocated in 0..=10_000_000_000u64,
            percent in 1..=100u8,
            delegator_share_percent in 0..=100u8,
        ) {
            let state = AllocationState {
                own_allocated,
                own_unallocated,
                delegated_allocated,
                delegated_unallocated,
            };
            let losses = compute_losses(&state, percent, delegator_share_percent).unwrap();

            // ── INVARIANT: losses bounded by allocation ──
            prop_assert!(losses.own_loss <= own_allocated);
            prop_assert!(losses.delegated_loss <= delegated_allocated);

            // ── INVARIANT: total loss at most `percent` of managed stake ──
            let managed = own_allocated as u128 + delegated_allocated as u128;
            prop_assert!(losses.total() as u128 <= managed * percent as u128 / 100);

            // ── INVARIANT: no delegator share, no delegator loss ──
            if delegator_share_percent == 0 {
                prop_assert_eq!(losses.delegated_loss, 0);
            }
            if delegator_share_percent == 100 {
                prop_assert_eq!(losses.own_loss, 0);
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(300))]

        #[test]
        fn applied_slash_spares_reserves(
            own in 1..=1_000_000u64,
            delegated in 1..=1_000_000u64,
            own_reserve in 0..=1_000_000u64,
            percent in 1..=100u8,
            delegator_share_percent in 0..=100u8,
        ) {
            let mut a = allocator(own, delegated, u64::MAX);
            if own_reserve > 0 {
                a.deposit(&Subject::pool(POOL), own_reserve, own + delegated).unwrap();
            }
            let before = a.state(POOL);
            let losses = compute_losses(&before, percent, delegator_share_percent).unwrap();
            let change = a.slash(POOL, losses.own_loss, losses.delegated_loss).unwrap();

            prop_assert_eq!(change.after.own_unallocated, before.own_unallocated);
            prop_assert_eq!(change.after.delegated_unallocated, before.delegated_unallocated);
            prop_assert_eq!(
                before.managed_stake() - change.after.managed_stake(),
                losses.total()
            );
        }
    }
}
