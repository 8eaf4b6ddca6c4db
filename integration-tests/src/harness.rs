//! TRv1 Stake Rewards Test Harness
//!
//! Wires a [`StakeRewards`] engine to the in-memory share ledger, subject
//! registry and manual clock, and exposes the operations tests need in pool
//! terms: register a pool, deposit or delegate stake, move time, post rewards
//! and claim them.
//!
//! Every stake operation first applies the change to the share ledger and
//! then reports it to the engine, the same order a host chain uses.

use {
    log::*,
    solana_pubkey::Pubkey,
    std::collections::BTreeMap,
    trv1_stake_rewards::{
        memory::{InMemoryStakeLedger, InMemorySubjectRegistry, ManualClock},
        AllocationState, Epoch, EpochReward, StakeRewards, StakeRewardsConfig, StakeRewardsError,
        Subject, UnixTimestamp,
    },
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// One week, the default epoch length.
pub const EPOCH_SECS: i64 = 604_800;

/// Four days, the default epoch phase offset.
pub const EPOCH_OFFSET_SECS: i64 = 345_600;

/// Managed-stake threshold given to every pool unless a test overrides it.
pub const DEFAULT_MAX_MANAGED_STAKE: u64 = 1_000_000_000;

/// Tokens in the reward vault at start.
pub const REWARD_VAULT: u64 = 1_000_000_000_000;

/// Epoch the harness clock starts in.
pub const GENESIS_EPOCH: Epoch = 100;

pub type TestEngine = StakeRewards<InMemoryStakeLedger, InMemorySubjectRegistry, ManualClock>;

/// Deterministic participant key.
pub fn participant(seed: u8) -> Pubkey {
    Pubkey::new_from_array([seed; 32])
}

// ─── Test harness ────────────────────────────────────────────────────────────

pub struct PoolHarness {
    pub engine: TestEngine,
    owners: BTreeMap<u64, Pubkey>,
}

impl Default for PoolHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolHarness {
    /// Default config with the clock at the start of [`GENESIS_EPOCH`].
    pub fn new() -> Self {
        Self::with_config(StakeRewardsConfig::default())
            .unwrap_or_else(|e| panic!("default config rejected: {e}"))
    }

    pub fn with_config(config: StakeRewardsConfig) -> Result<Self, StakeRewardsError> {
        let start = config
            .epoch_offset_secs
            .saturating_add(config.epoch_length_secs.saturating_mul(GENESIS_EPOCH as i64));
        let engine = StakeRewards::new(
            config,
            InMemoryStakeLedger::with_vault(REWARD_VAULT),
            InMemorySubjectRegistry::new(),
            ManualClock::new(start),
        )?;
        Ok(Self {
            engine,
            owners: BTreeMap::new(),
        })
    }

    // ── Pools ──

    /// Register pool `pool_id` owned by `owner` with the default threshold.
    pub fn add_pool(&mut self, pool_id: u64, owner: Pubkey) {
        self.engine
            .registry_mut()
            .register(pool_id, owner, DEFAULT_MAX_MANAGED_STAKE);
        self.owners.insert(pool_id, owner);
    }

    pub fn set_max_managed_stake(&mut self, pool_id: u64, max: u64) {
        self.engine
            .registry_mut()
            .set_max_managed_stake(pool_id, max);
    }

    /// Owner of a pool registered with [`Self::add_pool`]; the default key
    /// otherwise.
    pub fn owner(&self, pool_id: u64) -> Pubkey {
        self.owners.get(&pool_id).copied().unwrap_or_default()
    }

    pub fn allocation(&self, pool_id: u64) -> AllocationState {
        self.engine.allocation(pool_id)
    }

    // ── Time ──

    pub fn now(&self) -> UnixTimestamp {
        self.engine.now()
    }

    pub fn current_epoch(&self) -> Epoch {
        self.engine.current_epoch()
    }

    pub fn warp_to_epoch_start(&self, epoch: Epoch) {
        let ts = self.engine.epoch_clock().epoch_start(epoch);
        debug!("warp to start of epoch {epoch} ({ts})");
        self.engine.clock().set(ts);
    }

    /// Move to `fraction_bps / 10_000` of the way through `epoch`.
    pub fn warp_into_epoch(&self, epoch: Epoch, fraction_bps: i64) {
        let clock = self.engine.epoch_clock();
        let ts = clock
            .epoch_start(epoch)
            .saturating_add(clock.length_secs().saturating_mul(fraction_bps) / 10_000);
        debug!("warp to {fraction_bps} bps into epoch {epoch} ({ts})");
        self.engine.clock().set(ts);
    }

    pub fn warp_to_mid_epoch(&self, epoch: Epoch) {
        self.warp_into_epoch(epoch, 5_000);
    }

    pub fn warp_to_next_epoch(&self) {
        self.warp_to_epoch_start(self.current_epoch().saturating_add(1));
    }

    pub fn advance_secs(&self, secs: i64) {
        self.engine.clock().advance(secs);
    }

    // ── Stake ──

    pub fn deposit_own(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        let subject = Subject::pool(pool_id);
        self.engine.ledger_mut().credit(&subject, &owner, amount)?;
        self.engine.did_deposit(&subject, &owner, amount).map(|_| ())
    }

    pub fn withdraw_own(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        let subject = Subject::pool(pool_id);
        self.engine.ledger_mut().debit(&subject, &owner, amount)?;
        self.engine
            .did_initiate_withdrawal(&subject, &owner, amount)
            .map(|_| ())
    }

    pub fn delegate(&mut self, pool_id: u64, who: Pubkey, amount: u64) -> Result<(), StakeRewardsError> {
        let subject = Subject::delegator(pool_id);
        self.engine.ledger_mut().credit(&subject, &who, amount)?;
        self.engine.did_deposit(&subject, &who, amount).map(|_| ())
    }

    pub fn undelegate(&mut self, pool_id: u64, who: Pubkey, amount: u64) -> Result<(), StakeRewardsError> {
        let subject = Subject::delegator(pool_id);
        self.engine.ledger_mut().debit(&subject, &who, amount)?;
        self.engine
            .did_initiate_withdrawal(&subject, &who, amount)
            .map(|_| ())
    }

    pub fn transfer_delegation(
        &mut self,
        pool_id: u64,
        from: Pubkey,
        to: Pubkey,
        amount: u64,
    ) -> Result<(), StakeRewardsError> {
        let subject = Subject::delegator(pool_id);
        self.engine
            .ledger_mut()
            .move_shares(&subject, &from, &to, amount)?;
        self.engine.did_transfer_shares(&subject, &from, &to)
    }

    pub fn allocate_own(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .allocate(&Subject::pool(pool_id), &owner, amount)
            .map(|_| ())
    }

    pub fn unallocate_own(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .unallocate(&Subject::pool(pool_id), &owner, amount)
            .map(|_| ())
    }

    pub fn allocate_delegated(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .allocate(&Subject::delegator(pool_id), &owner, amount)
            .map(|_| ())
    }

    pub fn unallocate_delegated(&mut self, pool_id: u64, amount: u64) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .unallocate(&Subject::delegator(pool_id), &owner, amount)
            .map(|_| ())
    }

    // ── Fees, rewards, claims ──

    pub fn set_fee(&mut self, pool_id: u64, fee_bps: u16) -> Result<(), StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .set_delegation_fee(&Subject::pool(pool_id), &owner, fee_bps)
            .map(|_| ())
    }

    pub fn reward(&mut self, pool_id: u64, epoch: Epoch, amount: u64) -> Result<EpochReward, StakeRewardsError> {
        self.engine.reward(&Subject::pool(pool_id), epoch, amount)
    }

    pub fn owner_reward(&self, pool_id: u64, epoch: Epoch) -> u64 {
        self.engine
            .available_reward(&Subject::pool(pool_id), epoch, &self.owner(pool_id))
    }

    pub fn delegator_reward(&self, pool_id: u64, epoch: Epoch, who: &Pubkey) -> u64 {
        self.engine
            .available_reward(&Subject::delegator(pool_id), epoch, who)
    }

    pub fn claim_owner(&mut self, pool_id: u64, epochs: &[Epoch]) -> Result<u64, StakeRewardsError> {
        let owner = self.owner(pool_id);
        self.engine
            .claim_rewards(&Subject::pool(pool_id), &owner, epochs)
    }

    pub fn claim_delegator(
        &mut self,
        pool_id: u64,
        who: &Pubkey,
        epochs: &[Epoch],
    ) -> Result<u64, StakeRewardsError> {
        self.engine
            .claim_rewards(&Subject::delegator(pool_id), who, epochs)
    }

    pub fn paid_to(&self, who: &Pubkey) -> u64 {
        self.engine.ledger().paid_to(who)
    }

    pub fn vault_balance(&self) -> u64 {
        self.engine.ledger().vault_balance()
    }
}
