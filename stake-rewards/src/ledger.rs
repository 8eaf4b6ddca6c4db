//! Per-epoch reward bookkeeping.
//!
//! The ledger keeps four kinds of time-weighted series per pool: the owner's
//! allocated stake, the delegators' allocated stake, the total delegator
//! shares and each delegator's own shares. Allocation series decide how an
//! epoch reward splits between owner and delegators; share series decide how
//! the delegator part splits between delegators.
//!
//! Rewards are immutable once posted. A delegator entitlement is claimed once
//! per `(subject, participant, epoch)`; the owner entitlement of a pool epoch
//! is claimed once in total, whoever owns the pool at claim time.

use {
    crate::{
        accumulator::CheckpointSeries,
        allocator::AllocationChange,
        calculator::{delegator_reward, split_reward, EpochWeights, RewardSplit},
        epoch::{Epoch, EpochClock},
        error::StakeRewardsError,
        interfaces::UnixTimestamp,
        subject::{Subject, SubjectType},
    },
    borsh::{BorshDeserialize, BorshSerialize},
    log::*,
    solana_pubkey::Pubkey,
    std::collections::{BTreeMap, BTreeSet},
};

/// Which quantity a checkpoint series tracks.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, BorshSerialize, BorshDeserialize,
)]
pub enum SeriesKind {
    OwnAllocated,
    DelegatedAllocated,
    /// Sum of all delegator shares in the pool.
    DelegatorShares,
    /// Shares of one delegator.
    Delegator(Pubkey),
}

/// A posted epoch reward with the split frozen at posting time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EpochReward {
    pub epoch: Epoch,
    pub amount: u64,
    /// Delegation fee in force during `epoch`.
    pub fee_bps: u16,
    pub own_reward: u64,
    pub commission: u64,
    pub delegator_pool: u64,
    /// Share integral every delegator entitlement is divided by.
    pub delegator_shares_weight: u128,
}

impl EpochReward {
    pub fn split(&self) -> RewardSplit {
        RewardSplit {
            own_reward: self.own_reward,
            commission: self.commission,
            delegator_pool: self.delegator_pool,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct RewardEpochLedger {
    series: BTreeMap<(u64, SeriesKind), CheckpointSeries>,
    rewards: BTreeMap<(u64, Epoch), EpochReward>,
    /// Pool claims carry no participant.
    claimed: BTreeSet<(Subject, Option<Pubkey>, Epoch)>,
}

fn claim_key(
    subject: &Subject,
    participant: &Pubkey,
    epoch: Epoch,
) -> (Subject, Option<Pubkey>, Epoch) {
    match subject.subject_type {
        SubjectType::Pool => (*subject, None, epoch),
        SubjectType::Delegator => (*subject, Some(*participant), epoch),
    }
}

impl RewardEpochLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Checkpoints
    // -------------------------------------------------------------------------

    /// Checkpoint the allocation classes an allocator mutation touched.
    pub fn record_allocation(
        &mut self,
        change: &AllocationChange,
        timestamp: UnixTimestamp,
        epoch: Epoch,
    ) {
        for (subject_type, kind) in [
            (SubjectType::Pool, SeriesKind::OwnAllocated),
            (SubjectType::Delegator, SeriesKind::DelegatedAllocated),
        ] {
            if change.changed(subject_type) {
                self.series
                    .entry((change.pool_id, kind))
                    .or_default()
                    .record(timestamp, epoch, change.after.allocated(subject_type));
            }
        }
    }

    /// Checkpoint one delegator's share balance together with the pool total.
    pub fn record_delegator_shares(
        &mut self,
        pool_id: u64,
        participant: &Pubkey,
        shares: u64,
        total_shares: u64,
        timestamp: UnixTimestamp,
        epoch: Epoch,
    ) {
        self.series
            .entry((pool_id, SeriesKind::Delegator(*participant)))
            .or_default()
            .record(timestamp, epoch, shares);
        self.series
            .entry((pool_id, SeriesKind::DelegatorShares))
            .or_default()
            .record(timestamp, epoch, total_shares);
    }

    pub fn series(&self, pool_id: u64, kind: SeriesKind) -> Option<&CheckpointSeries> {
        self.series.get(&(pool_id, kind))
    }

    fn weight(&self, pool_id: u64, kind: SeriesKind, start: UnixTimestamp, end: UnixTimestamp) -> u128 {
        self.series(pool_id, kind)
            .map(|s| s.weight_between(start, end))
            .unwrap_or(0)
    }

    /// Time-weighted stake of the pool over the whole of `epoch`.
    pub fn epoch_weights(&self, pool_id: u64, epoch: Epoch, clock: &EpochClock) -> EpochWeights {
        let (start, end) = (clock.epoch_start(epoch), clock.epoch_end(epoch));
        EpochWeights {
            own: self.weight(pool_id, SeriesKind::OwnAllocated, start, end),
            delegated: self.weight(pool_id, SeriesKind::DelegatedAllocated, start, end),
            delegator_shares: self.weight(pool_id, SeriesKind::DelegatorShares, start, end),
        }
    }

    // -------------------------------------------------------------------------
    // Rewards
    // -------------------------------------------------------------------------

    /// Post the reward of a finished epoch and freeze its split.
    pub fn record_reward(
        &mut self,
        pool_id: u64,
        epoch: Epoch,
        amount: u64,
        fee_bps: u16,
        current_epoch: Epoch,
        clock: &EpochClock,
    ) -> Result<EpochReward, StakeRewardsError> {
        if amount == 0 {
            return Err(StakeRewardsError::ZeroAmount { what: "reward" });
        }
        if epoch >= current_epoch {
            return Err(StakeRewardsError::EpochNotElapsed {
                epoch,
                current_epoch,
            });
        }
        if self.rewards.contains_key(&(pool_id, epoch)) {
            return Err(StakeRewardsError::AlreadyRewarded { pool_id, epoch });
        }

        let weights = self.epoch_weights(pool_id, epoch, clock);
        if weights.managed() == 0 {
            warn!("pool {pool_id} rewarded {amount} for epoch {epoch} without allocated stake");
        }
        let split = split_reward(amount, fee_bps, &weights);
        let reward = EpochReward {
            epoch,
            amount,
            fee_bps,
            own_reward: split.own_reward,
            commission: split.commission,
            delegator_pool: split.delegator_pool,
            delegator_shares_weight: weights.delegator_shares,
        };
        self.rewards.insert((pool_id, epoch), reward);
        Ok(reward)
    }

    pub fn epoch_reward(&self, pool_id: u64, epoch: Epoch) -> Option<&EpochReward> {
        self.rewards.get(&(pool_id, epoch))
    }

    pub fn is_rewarded(&self, pool_id: u64, epoch: Epoch) -> bool {
        self.rewards.contains_key(&(pool_id, epoch))
    }

    // -------------------------------------------------------------------------
    // Claims
    // -------------------------------------------------------------------------

    pub fn is_claimed(&self, subject: &Subject, participant: &Pubkey, epoch: Epoch) -> bool {
        self.claimed.contains(&claim_key(subject, participant, epoch))
    }

    /// Reward `participant` is entitled to for `epoch`, whether or not it was
    /// already claimed.
    ///
    /// Pool rewards belong to `owner` alone; anyone else is entitled to 0.
    pub fn entitlement(
        &self,
        subject: &Subject,
        epoch: Epoch,
        participant: &Pubkey,
        owner: Option<&Pubkey>,
        clock: &EpochClock,
    ) -> u64 {
        let pool_id = subject.pool_id();
        let Some(reward) = self.epoch_reward(pool_id, epoch) else {
            return 0;
        };
        match subject.subject_type {
            SubjectType::Pool => {
                if owner == Some(participant) {
                    reward.split().owner_total()
                } else {
                    0
                }
            }
            SubjectType::Delegator => {
                let (start, end) = (clock.epoch_start(epoch), clock.epoch_end(epoch));
                let weight = self.weight(pool_id, SeriesKind::Delegator(*participant), start, end);
                delegator_reward(&reward.split(), weight, reward.delegator_shares_weight)
            }
        }
    }

    /// Unclaimed reward of `participant` for `epoch`.
    pub fn available_reward(
        &self,
        subject: &Subject,
        epoch: Epoch,
        participant: &Pubkey,
        owner: Option<&Pubkey>,
        clock: &EpochClock,
    ) -> u64 {
        if self.is_claimed(subject, participant, epoch) {
            return 0;
        }
        self.entitlement(subject, epoch, participant, owner, clock)
    }

    /// Validate a batch claim without changing anything.
    ///
    /// Returns the per-epoch amounts in request order. Fails on the first
    /// epoch that is already claimed (including a repeat within the batch) or
    /// that pays nothing.
    pub fn prepare_claim(
        &self,
        subject: &Subject,
        participant: &Pubkey,
        epochs: &[Epoch],
        owner: Option<&Pubkey>,
        clock: &EpochClock,
    ) -> Result<Vec<(Epoch, u64)>, StakeRewardsError> {
        if epochs.is_empty() {
            return Err(StakeRewardsError::ZeroAmount { what: "epochs" });
        }
        let mut seen = BTreeSet::new();
        let mut amounts = Vec::with_capacity(epochs.len());
        for &epoch in epochs {
            if self.is_claimed(subject, participant, epoch) || !seen.insert(epoch) {
                return Err(StakeRewardsError::AlreadyClaimed { epoch });
            }
            let amount = self.entitlement(subject, epoch, participant, owner, clock);
            if amount == 0 {
                return Err(StakeRewardsError::ZeroAmount {
                    what: "epoch rewards",
                });
            }
            amounts.push((epoch, amount));
        }
        Ok(amounts)
    }

    pub fn mark_claimed(&mut self, subject: &Subject, participant: &Pubkey, epochs: &[Epoch]) {
        for &epoch in epochs {
            self.claimed.insert(claim_key(subject, participant, epoch));
        }
    }
}
