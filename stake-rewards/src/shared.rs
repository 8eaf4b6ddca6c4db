//! Thread-safe handle around a [`StakeRewards`] engine.
//!
//! Mutations take the write lock, so they are applied one at a time in lock
//! acquisition order. Queries take the read lock and always observe the state
//! between two complete mutations.

use {
    crate::{
        engine::StakeRewards,
        epoch::Epoch,
        error::StakeRewardsError,
        interfaces::{Clock, StakeLedger, SubjectRegistry},
        subject::Subject,
    },
    solana_pubkey::Pubkey,
    std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub struct SharedStakeRewards<L, R, C> {
    inner: Arc<RwLock<StakeRewards<L, R, C>>>,
}

impl<L, R, C> Clone for SharedStakeRewards<L, R, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: StakeLedger, R: SubjectRegistry, C: Clock> SharedStakeRewards<L, R, C> {
    pub fn new(engine: StakeRewards<L, R, C>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
        }
    }

    /// Read guard for queries. A panic in another holder does not make the
    /// state unreadable since every mutation commits only after validation.
    pub fn read(&self) -> RwLockReadGuard<'_, StakeRewards<L, R, C>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, StakeRewards<L, R, C>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn available_reward(&self, subject: &Subject, epoch: Epoch, participant: &Pubkey) -> u64 {
        self.read().available_reward(subject, epoch, participant)
    }

    pub fn reward(&self, subject: &Subject, epoch: Epoch, amount: u64) -> Result<(), StakeRewardsError> {
        self.write().reward(subject, epoch, amount).map(|_| ())
    }

    pub fn claim_rewards(
        &self,
        subject: &Subject,
        participant: &Pubkey,
        epochs: &[Epoch],
    ) -> Result<u64, StakeRewardsError> {
        self.write().claim_rewards(subject, participant, epochs)
    }
}
