//! Per-pool stake allocation.
//!
//! Every pool tracks four amounts: own stake that is actively backing the pool
//! (`own_allocated`), own stake held in reserve (`own_unallocated`) and the
//! same pair for delegated stake. `allocate`/`unallocate` only move stake
//! between the reserve and the active side of one class; deposits, withdrawals
//! and slashes are the only operations that change a class total.
//!
//! All operations compute the next state on a copy and commit it only when
//! every check passed.

use {
    crate::{error::StakeRewardsError, subject::{Subject, SubjectType}},
    borsh::{BorshDeserialize, BorshSerialize},
    log::*,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct AllocationState {
    pub own_allocated: u64,
    pub own_unallocated: u64,
    pub delegated_allocated: u64,
    pub delegated_unallocated: u64,
}

impl AllocationState {
    /// `own_allocated + delegated_allocated`.
    pub fn managed_stake(&self) -> u64 {
        self.own_allocated.saturating_add(self.delegated_allocated)
    }

    pub fn allocated(&self, subject_type: SubjectType) -> u64 {
        match subject_type {
            SubjectType::Pool => self.own_allocated,
            SubjectType::Delegator => self.delegated_allocated,
        }
    }

    pub fn unallocated(&self, subject_type: SubjectType) -> u64 {
        match subject_type {
            SubjectType::Pool => self.own_unallocated,
            SubjectType::Delegator => self.delegated_unallocated,
        }
    }

    /// Allocated plus unallocated stake of one class.
    pub fn total(&self, subject_type: SubjectType) -> u64 {
        self.allocated(subject_type)
            .saturating_add(self.unallocated(subject_type))
    }

    fn set(&mut self, subject_type: SubjectType, allocated: u64, unallocated: u64) {
        match subject_type {
            SubjectType::Pool => {
                self.own_allocated = allocated;
                self.own_unallocated = unallocated;
            }
            SubjectType::Delegator => {
                self.delegated_allocated = allocated;
                self.delegated_unallocated = unallocated;
            }
        }
    }
}

/// Allocation fact emitted by every successful mutation, consumed by the
/// reward ledger's checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationChange {
    pub pool_id: u64,
    pub before: AllocationState,
    pub after: AllocationState,
}

impl AllocationChange {
    pub fn changed(&self, subject_type: SubjectType) -> bool {
        self.before.allocated(subject_type) != self.after.allocated(subject_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeAllocator {
    pools: BTreeMap<u64, AllocationState>,
}

impl StakeAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, pool_id: u64) -> AllocationState {
        self.pools.get(&pool_id).copied().unwrap_or_default()
    }

    pub fn managed_stake(&self, pool_id: u64) -> u64 {
        self.state(pool_id).managed_stake()
    }

    pub fn allocated_stake_for(&self, subject: &Subject) -> u64 {
        self.state(subject.pool_id()).allocated(subject.subject_type)
    }

    pub fn unallocated_stake_for(&self, subject: &Subject) -> u64 {
        self.state(subject.pool_id()).unallocated(subject.subject_type)
    }

    /// Move `amount` of the subject's class from reserve to active.
    pub fn allocate(
        &mut self,
        subject: &Subject,
        amount: u64,
        max_managed_stake: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        if amount == 0 {
            return Err(StakeRewardsError::ZeroAmount { what: "allocation" });
        }
        let before = self.state(subject.pool_id());
        let class = subject.subject_type;
        let unallocated = before.unallocated(class);
        if amount > unallocated {
            return Err(StakeRewardsError::InsufficientUnallocatedStake {
                requested: amount,
                available: unallocated,
            });
        }
        let managed = before
            .managed_stake()
            .checked_add(amount)
            .ok_or(StakeRewardsError::Overflow)?;
        if managed > max_managed_stake {
            return Err(StakeRewardsError::AllocationExceedsMax {
                requested: amount,
                max: max_managed_stake,
            });
        }

        let mut after = before;
        after.set(
            class,
            before
                .allocated(class)
                .checked_add(amount)
                .ok_or(StakeRewardsError::Overflow)?,
            unallocated.saturating_sub(amount),
        );
        Ok(self.commit(subject.pool_id(), before, after))
    }

    /// Move `amount` of the subject's class from active to reserve.
    pub fn unallocate(
        &mut self,
        subject: &Subject,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        if amount == 0 {
            return Err(StakeRewardsError::ZeroAmount { what: "unallocation" });
        }
        let before = self.state(subject.pool_id());
        let class = subject.subject_type;
        let allocated = before.allocated(class);
        if amount > allocated {
            return Err(StakeRewardsError::InsufficientAllocatedStake {
                requested: amount,
                available: allocated,
            });
        }

        let mut after = before;
        after.set(
            class,
            allocated.saturating_sub(amount),
            before
                .unallocated(class)
                .checked_add(amount)
                .ok_or(StakeRewardsError::Overflow)?,
        );
        Ok(self.commit(subject.pool_id(), before, after))
    }

    /// Credit a deposit to the subject's class, allocating as much of it as
    /// the pool's headroom allows and keeping the rest in reserve.
    pub fn deposit(
        &mut self,
        subject: &Subject,
        amount: u64,
        max_managed_stake: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        if amount == 0 {
            return Err(StakeRewardsError::ZeroAmount { what: "deposit" });
        }
        let before = self.state(subject.pool_id());
        let class = subject.subject_type;
        let headroom = max_managed_stake.saturating_sub(before.managed_stake());
        let to_allocate = amount.min(headroom);
        let to_reserve = amount.saturating_sub(to_allocate);

        let mut after = before;
        after.set(
            class,
            before
                .allocated(class)
                .checked_add(to_allocate)
                .ok_or(StakeRewardsError::Overflow)?,
            before
                .unallocated(class)
                .checked_add(to_reserve)
                .ok_or(StakeRewardsError::Overflow)?,
        );
        Ok(self.commit(subject.pool_id(), before, after))
    }

    /// Remove a withdrawal from the subject's class: reserve first, then
    /// active stake.
    pub fn withdraw(
        &mut self,
        subject: &Subject,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        if amount == 0 {
            return Err(StakeRewardsError::ZeroAmount { what: "withdrawal" });
        }
        let before = self.state(subject.pool_id());
        let class = subject.subject_type;
        let total = before.total(class);
        if amount > total {
            return Err(StakeRewardsError::InsufficientStake {
                requested: amount,
                available: total,
            });
        }

        let unallocated = before.unallocated(class);
        let from_reserve = amount.min(unallocated);
        let from_active = amount.saturating_sub(from_reserve);
        let mut after = before;
        after.set(
            class,
            before.allocated(class).saturating_sub(from_active),
            unallocated.saturating_sub(from_reserve),
        );
        Ok(self.commit(subject.pool_id(), before, after))
    }

    /// Carve slashing losses out of the allocated stake of both classes.
    pub fn slash(
        &mut self,
        pool_id: u64,
        own_loss: u64,
        delegated_loss: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        let before = self.state(pool_id);
        if own_loss > before.own_allocated {
            return Err(StakeRewardsError::InsufficientStake {
                requested: own_loss,
                available: before.own_allocated,
            });
        }
        if delegated_loss > before.delegated_allocated {
            return Err(StakeRewardsError::InsufficientStake {
                requested: delegated_loss,
                available: before.delegated_allocated,
            });
        }

        let mut after = before;
        after.own_allocated = before.own_allocated.saturating_sub(own_loss);
        after.delegated_allocated = before.delegated_allocated.saturating_sub(delegated_loss);
        Ok(self.commit(pool_id, before, after))
    }

    /// Pools with any recorded stake.
    pub fn pool_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.pools.keys().copied()
    }

    fn commit(
        &mut self,
        pool_id: u64,
        before: AllocationState,
        after: AllocationState,
    ) -> AllocationChange {
        debug!(
            "pool {pool_id} allocation: own {}/{} delegated {}/{} (allocated/unallocated)",
            after.own_allocated,
            after.own_unallocated,
            after.delegated_allocated,
            after.delegated_unallocated
        );
        self.pools.insert(pool_id, after);
        AllocationChange {
            pool_id,
            before,
            after,
        }
    }
}
