//! TRv1 Stake Rewards Integration Tests
//!
//! End-to-end scenarios for the stake-rewards engine, driven through
//! [`harness::PoolHarness`].
//!
//! # Areas Tested
//!
//! 1. **Reward distribution** — time-weighted owner/delegator split, mid-epoch
//!    deposits, withdrawals and share transfers
//! 2. **Allocation** — reserve vs managed stake, managed-stake threshold
//! 3. **Delegation fee** — next-epoch activation, cooldown, fee history
//! 4. **Claims** — single and batched claims, idempotence, payout failures
//! 5. **Slashing** — loss split, reserve protection, effect on later rewards

pub mod harness;
