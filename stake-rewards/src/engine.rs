//! The stake-rewards engine.
//!
//! [`StakeRewards`] owns the allocation table, the delegation fee schedule,
//! the reward ledger and the slash history, and wires them to the external
//! collaborators (share ledger, subject registry, clock). Every mutating
//! method validates everything before it changes anything, so a returned
//! error always means "no state change".

use {
    crate::{
        allocator::{AllocationChange, AllocationState, StakeAllocator},
        commission::{CommissionFee, CommissionSchedule, FeeEntry},
        config::{validate_config, StakeRewardsConfig},
        epoch::{Epoch, EpochClock},
        error::StakeRewardsError,
        events::StakeRewardsEvent,
        interfaces::{Clock, StakeLedger, SubjectRegistry, UnixTimestamp},
        ledger::{EpochReward, RewardEpochLedger},
        slashing::{compute_losses, SlashEvent, SlashingPropagator},
        snapshot::LedgerSnapshot,
        subject::{Subject, SubjectType},
    },
    log::*,
    solana_pubkey::Pubkey,
    std::mem,
};

pub struct StakeRewards<L, R, C> {
    config: StakeRewardsConfig,
    epochs: EpochClock,
    ledger: L,
    registry: R,
    clock: C,
    allocator: StakeAllocator,
    commission: CommissionSchedule,
    rewards: RewardEpochLedger,
    slashing: SlashingPropagator,
    /// Buffered notifications, oldest first.
    events: Vec<StakeRewardsEvent>,
}

impl<L: StakeLedger, R: SubjectRegistry, C: Clock> StakeRewards<L, R, C> {
    pub fn new(
        config: StakeRewardsConfig,
        ledger: L,
        registry: R,
        clock: C,
    ) -> Result<Self, StakeRewardsError> {
        validate_config(&config)?;
        Ok(Self {
            epochs: EpochClock::from_config(&config),
            commission: CommissionSchedule::new(
                config.default_fee_bps,
                config.fee_change_cooldown_secs,
            ),
            config,
            ledger,
            registry,
            clock,
            allocator: StakeAllocator::new(),
            rewards: RewardEpochLedger::new(),
            slashing: SlashingPropagator::new(),
            events: Vec::new(),
        })
    }

    /// Rebuild an engine from a snapshot taken with [`Self::snapshot`].
    pub fn from_snapshot(
        snapshot: LedgerSnapshot,
        ledger: L,
        registry: R,
        clock: C,
    ) -> Result<Self, StakeRewardsError> {
        validate_config(&snapshot.config)?;
        Ok(Self {
            epochs: EpochClock::from_config(&snapshot.config),
            config: snapshot.config,
            ledger,
            registry,
            clock,
            allocator: snapshot.allocator,
            commission: snapshot.commission,
            rewards: snapshot.rewards,
            slashing: snapshot.slashing,
            events: Vec::new(),
        })
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            config: self.config.clone(),
            allocator: self.allocator.clone(),
            commission: self.commission.clone(),
            rewards: self.rewards.clone(),
            slashing: self.slashing.clone(),
        }
    }

    // -- Collaborators --

    pub fn config(&self) -> &StakeRewardsConfig {
        &self.config
    }

    pub fn epoch_clock(&self) -> &EpochClock {
        &self.epochs
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The share ledger. Callers apply deposits, withdrawals and share
    /// transfers here and then report them through the `did_*` hooks.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> UnixTimestamp {
        self.clock.now()
    }

    pub fn current_epoch(&self) -> Epoch {
        self.epochs.epoch_of(self.clock.now())
    }

    /// Take every buffered event, oldest first.
    pub fn drain_events(&mut self) -> Vec<StakeRewardsEvent> {
        mem::take(&mut self.events)
    }

    // -- Stake lifecycle hooks --

    /// Record a deposit the share ledger already credited.
    ///
    /// Own stake may only be deposited by the pool owner. The deposit is
    /// allocated up to the pool's managed-stake threshold; the rest is kept
    /// in reserve.
    pub fn did_deposit(
        &mut self,
        subject: &Subject,
        participant: &Pubkey,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        let pool_id = subject.pool_id();
        let owner = self.owner_of(pool_id)?;
        if subject.subject_type == SubjectType::Pool && *participant != owner {
            return Err(self.not_owner(participant, pool_id));
        }
        let max = self.registry.max_managed_stake(pool_id);
        let change = self.allocator.deposit(subject, amount, max)?;
        info!("{subject}: {participant} deposited {amount}");
        self.after_stake_change(subject, Some(participant), &change);
        Ok(change)
    }

    /// Record a withdrawal the share ledger already debited.
    pub fn did_initiate_withdrawal(
        &mut self,
        subject: &Subject,
        participant: &Pubkey,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        let pool_id = subject.pool_id();
        let owner = self.owner_of(pool_id)?;
        if subject.subject_type == SubjectType::Pool && *participant != owner {
            return Err(self.not_owner(participant, pool_id));
        }
        let change = self.allocator.withdraw(subject, amount)?;
        info!("{subject}: {participant} initiated withdrawal of {amount}");
        self.after_stake_change(subject, Some(participant), &change);
        Ok(change)
    }

    /// Record a delegator share transfer the share ledger already applied.
    ///
    /// Allocation is unaffected; only the two participants' share series are
    /// checkpointed. Pool shares are not tracked per participant, so pool
    /// subjects are accepted and ignored.
    pub fn did_transfer_shares(
        &mut self,
        subject: &Subject,
        from: &Pubkey,
        to: &Pubkey,
    ) -> Result<(), StakeRewardsError> {
        if !subject.subject_type.is_delegator() {
            return Ok(());
        }
        self.owner_of(subject.pool_id())?;
        debug!("{subject}: shares moved from {from} to {to}");
        self.checkpoint_shares(subject, from);
        self.checkpoint_shares(subject, to);
        Ok(())
    }

    // -- Allocation --

    /// Move reserve stake of the subject's class into the pool's managed
    /// stake. Only the pool owner manages allocation.
    pub fn allocate(
        &mut self,
        subject: &Subject,
        sender: &Pubkey,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        let pool_id = subject.pool_id();
        self.ensure_owner(pool_id, sender)?;
        let max = self.registry.max_managed_stake(pool_id);
        let change = self.allocator.allocate(subject, amount, max)?;
        self.after_stake_change(subject, None, &change);
        Ok(change)
    }

    pub fn unallocate(
        &mut self,
        subject: &Subject,
        sender: &Pubkey,
        amount: u64,
    ) -> Result<AllocationChange, StakeRewardsError> {
        self.ensure_owner(subject.pool_id(), sender)?;
        let change = self.allocator.unallocate(subject, amount)?;
        self.after_stake_change(subject, None, &change);
        Ok(change)
    }

    pub fn allocation(&self, pool_id: u64) -> AllocationState {
        self.allocator.state(pool_id)
    }

    pub fn allocated_stake_for(&self, subject: &Subject) -> u64 {
        self.allocator.allocated_stake_for(subject)
    }

    pub fn unallocated_stake_for(&self, subject: &Subject) -> u64 {
        self.allocator.unallocated_stake_for(subject)
    }

    pub fn allocated_managed_stake(&self, pool_id: u64) -> u64 {
        self.allocator.managed_stake(pool_id)
    }

    // -- Delegation fee --

    /// Schedule a new delegation fee for the next epoch.
    pub fn set_delegation_fee(
        &mut self,
        subject: &Subject,
        sender: &Pubkey,
        fee_bps: u16,
    ) -> Result<FeeEntry, StakeRewardsError> {
        let pool_id = subject.pool_id();
        self.ensure_owner(pool_id, sender)?;
        let now = self.clock.now();
        let now_epoch = self.epochs.epoch_of(now);
        let entry = self
            .commission
            .set_fee(pool_id, fee_bps, now, now_epoch)
            .inspect_err(|e| warn!("pool {pool_id}: fee change to {fee_bps} bps rejected: {e}"))?;
        info!(
            "pool {pool_id}: delegation fee {fee_bps} bps from epoch {}",
            entry.effective_epoch
        );
        self.events.push(StakeRewardsEvent::DelegationFeeSet {
            subject: subject.managing_pool(),
            fee_bps,
            effective_epoch: entry.effective_epoch,
        });
        Ok(entry)
    }

    /// Fee in force during `epoch`.
    pub fn delegation_fee(&self, subject: &Subject, epoch: Epoch) -> u16 {
        self.commission.effective_fee(subject.pool_id(), epoch)
    }

    /// Fee in force now plus any change still pending.
    pub fn delegation_fee_state(&self, subject: &Subject) -> CommissionFee {
        self.commission
            .fee_state(subject.pool_id(), self.current_epoch())
    }

    // -- Rewards --

    /// Post the reward of a finished epoch. Allowed once per pool and epoch.
    pub fn reward(
        &mut self,
        subject: &Subject,
        epoch: Epoch,
        amount: u64,
    ) -> Result<EpochReward, StakeRewardsError> {
        let pool_id = subject.pool_id();
        let fee_bps = self.commission.effective_fee(pool_id, epoch);
        let current_epoch = self.current_epoch();
        let reward = self
            .rewards
            .record_reward(pool_id, epoch, amount, fee_bps, current_epoch, &self.epochs)
            .inspect_err(|e| warn!("pool {pool_id}: reward for epoch {epoch} rejected: {e}"))?;
        info!(
            "pool {pool_id}: epoch {epoch} rewarded {amount} (owner {}, delegators {}, fee {fee_bps} bps)",
            reward.split().owner_total(),
            reward.delegator_pool
        );
        self.events.push(StakeRewardsEvent::Rewarded {
            subject: subject.managing_pool(),
            epoch,
            amount,
        });
        Ok(reward)
    }

    pub fn epoch_reward(&self, pool_id: u64, epoch: Epoch) -> Option<&EpochReward> {
        self.rewards.epoch_reward(pool_id, epoch)
    }

    /// Unclaimed reward `participant` can collect for `epoch`.
    pub fn available_reward(&self, subject: &Subject, epoch: Epoch, participant: &Pubkey) -> u64 {
        let owner = self.registry.owner_of(subject.pool_id());
        self.rewards
            .available_reward(subject, epoch, participant, owner.as_ref(), &self.epochs)
    }

    pub fn is_claimed(&self, subject: &Subject, participant: &Pubkey, epoch: Epoch) -> bool {
        self.rewards.is_claimed(subject, participant, epoch)
    }

    /// Pay out the rewards of `epochs` in a single transfer.
    ///
    /// Either every epoch is claimed or none is: the batch is validated in
    /// order, paid, and only then marked claimed.
    pub fn claim_rewards(
        &mut self,
        subject: &Subject,
        participant: &Pubkey,
        epochs: &[Epoch],
    ) -> Result<u64, StakeRewardsError> {
        let owner = self.registry.owner_of(subject.pool_id());
        let amounts = self
            .rewards
            .prepare_claim(subject, participant, epochs, owner.as_ref(), &self.epochs)
            .inspect_err(|e| warn!("{subject}: claim by {participant} rejected: {e}"))?;
        let total = amounts
            .iter()
            .try_fold(0u64, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(StakeRewardsError::Overflow)?;

        self.ledger.transfer(participant, total)?;
        self.rewards.mark_claimed(subject, participant, epochs);
        info!("{subject}: {participant} claimed {total} for epochs {epochs:?}");
        self.events
            .extend(amounts.into_iter().map(|(epoch, amount)| StakeRewardsEvent::ClaimedRewards {
                subject: *subject,
                participant: *participant,
                epoch,
                amount,
            }));
        Ok(total)
    }

    // -- Slashing --

    /// Slash `percent` of the pool's allocated stake, with
    /// `delegator_share_percent` of the penalty carried by delegators.
    pub fn slash(
        &mut self,
        subject: &Subject,
        percent: u8,
        delegator_share_percent: u8,
    ) -> Result<SlashEvent, StakeRewardsError> {
        let pool_id = subject.pool_id();
        self.owner_of(pool_id)?;
        let losses = compute_losses(&self.allocator.state(pool_id), percent, delegator_share_percent)?;
        let change = self
            .allocator
            .slash(pool_id, losses.own_loss, losses.delegated_loss)?;

        let timestamp = self.clock.now();
        let epoch = self.epochs.epoch_of(timestamp);
        self.rewards.record_allocation(&change, timestamp, epoch);
        let event = SlashEvent {
            pool_id,
            epoch,
            timestamp,
            percent,
            delegator_share_percent,
            own_loss: losses.own_loss,
            delegated_loss: losses.delegated_loss,
        };
        self.slashing.record(event);
        info!(
            "pool {pool_id}: slashed {percent}% ({delegator_share_percent}% on delegators): own -{}, delegated -{}",
            losses.own_loss, losses.delegated_loss
        );
        self.events.push(StakeRewardsEvent::Slashed {
            subject: subject.managing_pool(),
            epoch,
            own_loss: losses.own_loss,
            delegated_loss: losses.delegated_loss,
        });
        Ok(event)
    }

    pub fn slash_history(&self, pool_id: u64) -> &[SlashEvent] {
        self.slashing.history(pool_id)
    }

    // -- Internals --

    fn owner_of(&self, pool_id: u64) -> Result<Pubkey, StakeRewardsError> {
        self.registry
            .owner_of(pool_id)
            .ok_or(StakeRewardsError::UnknownSubject { pool_id })
    }

    fn ensure_owner(&self, pool_id: u64, sender: &Pubkey) -> Result<Pubkey, StakeRewardsError> {
        let owner = self.owner_of(pool_id)?;
        if *sender != owner {
            return Err(self.not_owner(sender, pool_id));
        }
        Ok(owner)
    }

    fn not_owner(&self, sender: &Pubkey, pool_id: u64) -> StakeRewardsError {
        warn!("{sender} is not the owner of pool {pool_id}");
        StakeRewardsError::SenderNotOwner {
            sender: *sender,
            pool_id,
        }
    }

    fn after_stake_change(
        &mut self,
        subject: &Subject,
        participant: Option<&Pubkey>,
        change: &AllocationChange,
    ) {
        let timestamp = self.clock.now();
        let epoch = self.epochs.epoch_of(timestamp);
        self.rewards.record_allocation(change, timestamp, epoch);
        if let Some(participant) = participant {
            if subject.subject_type.is_delegator() {
                self.checkpoint_shares(subject, participant);
            }
        }
        let class = subject.subject_type;
        self.events.push(StakeRewardsEvent::AllocationChanged {
            subject: *subject,
            allocated: change.after.allocated(class),
            unallocated: change.after.unallocated(class),
            managed_stake: change.after.managed_stake(),
        });
    }

    fn checkpoint_shares(&mut self, subject: &Subject, participant: &Pubkey) {
        let timestamp = self.clock.now();
        let epoch = self.epochs.epoch_of(timestamp);
        let shares = self.ledger.stake_of(subject, participant);
        let total = self.ledger.total_deposited(subject);
        debug!("{subject}: {participant} holds {shares} of {total} shares");
        self.rewards
            .record_delegator_shares(subject.pool_id(), participant, shares, total, timestamp, epoch);
    }
}
