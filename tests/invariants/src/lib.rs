//! TRv1 Property-Based Invariant Tests
//!
//! Uses proptest to verify stake-rewards invariants across:
//! - Allocation bookkeeping and slashing bounds
//! - Reward conservation, time weighting and claim idempotence
//! - Delegation fee deferral

pub mod allocation_invariants;
pub mod fee_invariants;
pub mod reward_invariants;
