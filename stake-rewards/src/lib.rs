//! # TRv1 Stake Rewards
//!
//! Epoch-aware **stake allocation and reward distribution** for delegated
//! staking pools.
//!
//! Every pool has an owner and any number of delegators. Deposited stake is
//! either **allocated** (actively backing the pool) or **unallocated** (held
//! in reserve). Once an epoch is over, a reward for that epoch is posted once
//! and split between the owner and the delegators by **time-weighted**
//! allocated stake: stake that joined halfway through the epoch earns half as
//! much as stake that was there all along. The owner additionally collects a
//! **delegation fee** on the delegators' part; fee changes only apply from the
//! next epoch on and are rate-limited by a cooldown.
//!
//! ## Quick start
//!
//! ```rust
//! use solana_pubkey::Pubkey;
//! use trv1_stake_rewards::{
//!     memory::{InMemoryStakeLedger, InMemorySubjectRegistry, ManualClock},
//!     StakeRewards, StakeRewardsConfig, Subject,
//! };
//!
//! let config = StakeRewardsConfig::default();
//! let owner = Pubkey::new_from_array([1; 32]);
//! let delegator = Pubkey::new_from_array([2; 32]);
//!
//! let mut registry = InMemorySubjectRegistry::new();
//! registry.register(1, owner, 1_000_000);
//! let start = config.epoch_offset_secs;
//! let mut engine = StakeRewards::new(
//!     config,
//!     InMemoryStakeLedger::with_vault(1_000_000),
//!     registry,
//!     ManualClock::new(start),
//! )
//! .unwrap();
//!
//! // The share ledger credits the deposit, then the engine is told about it.
//! let (pool, delegated) = (Subject::pool(1), Subject::delegator(1));
//! engine.ledger_mut().credit(&pool, &owner, 100).unwrap();
//! engine.did_deposit(&pool, &owner, 100).unwrap();
//! engine.ledger_mut().credit(&delegated, &delegator, 100).unwrap();
//! engine.did_deposit(&delegated, &delegator, 100).unwrap();
//!
//! // After epoch 0 is over, post its reward and claim.
//! engine.clock().advance(engine.epoch_clock().length_secs());
//! engine.reward(&pool, 0, 2_000).unwrap();
//! assert_eq!(engine.available_reward(&pool, 0, &owner), 1_000);
//! assert_eq!(engine.claim_rewards(&delegated, &delegator, &[0]).unwrap(), 1_000);
//! ```
//!
//! See [`calculator`] for the reward formula and [`config`] for tunables.

pub mod accumulator;
pub mod allocator;
pub mod calculator;
pub mod commission;
pub mod config;
pub mod constants;
pub mod engine;
pub mod epoch;
pub mod error;
pub mod events;
pub mod interfaces;
pub mod ledger;
pub mod memory;
pub mod shared;
pub mod slashing;
pub mod snapshot;
pub mod subject;


// Re-exports for convenience.
pub use {
    allocator::{AllocationChange, AllocationState},
    commission::{CommissionFee, FeeEntry},
    config::StakeRewardsConfig,
    engine::StakeRewards,
    epoch::{Epoch, EpochClock},
    error::{StakeRewardsError, TransferError},
    events::StakeRewardsEvent,
    interfaces::{Clock, StakeLedger, SubjectRegistry, SystemClock, UnixTimestamp},
    ledger::EpochReward,
    shared::SharedStakeRewards,
    slashing::SlashEvent,
    snapshot::LedgerSnapshot,
    subject::{Subject, SubjectType},
};
