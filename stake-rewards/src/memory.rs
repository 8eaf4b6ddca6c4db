//! In-memory collaborators for tests, simulations and single-process hosts.

use {
    crate::{
        error::{StakeRewardsError, TransferError},
        interfaces::{Clock, StakeLedger, SubjectRegistry, UnixTimestamp},
        subject::Subject,
    },
    solana_pubkey::Pubkey,
    std::{
        collections::{BTreeMap, BTreeSet},
        sync::atomic::{AtomicI64, Ordering},
    },
};

// ---------------------------------------------------------------------------
// Share ledger
// ---------------------------------------------------------------------------

/// Share balances per subject plus a reward vault that pays claims.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStakeLedger {
    shares: BTreeMap<Subject, BTreeMap<Pubkey, u64>>,
    vault: u64,
    paid: BTreeMap<Pubkey, u64>,
    rejected: BTreeSet<Pubkey>,
}

impl InMemoryStakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vault(vault: u64) -> Self {
        Self {
            vault,
            ..Self::default()
        }
    }

    pub fn fund_vault(&mut self, amount: u64) {
        self.vault = self.vault.saturating_add(amount);
    }

    pub fn vault_balance(&self) -> u64 {
        self.vault
    }

    /// Total reward paid to `recipient` so far.
    pub fn paid_to(&self, recipient: &Pubkey) -> u64 {
        self.paid.get(recipient).copied().unwrap_or(0)
    }

    /// Refuse every future transfer to `recipient`.
    pub fn reject_recipient(&mut self, recipient: Pubkey) {
        self.rejected.insert(recipient);
    }

    /// Mint `amount` shares of `subject` to `participant`.
    pub fn credit(
        &mut self,
        subject: &Subject,
        participant: &Pubkey,
        amount: u64,
    ) -> Result<(), StakeRewardsError> {
        let balance = self
            .shares
            .entry(*subject)
            .or_default()
            .entry(*participant)
            .or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(StakeRewardsError::Overflow)?;
        Ok(())
    }

    /// Burn `amount` shares of `subject` from `participant`.
    pub fn debit(
        &mut self,
        subject: &Subject,
        participant: &Pubkey,
        amount: u64,
    ) -> Result<(), StakeRewardsError> {
        let available = self.stake_of(subject, participant);
        if amount > available {
            return Err(StakeRewardsError::InsufficientStake {
                requested: amount,
                available,
            });
        }
        let holders = self.shares.entry(*subject).or_default();
        match available.saturating_sub(amount) {
            0 => {
                holders.remove(participant);
            }
            rest => {
                holders.insert(*participant, rest);
            }
        }
        Ok(())
    }

    /// Move `amount` shares of `subject` between two holders.
    pub fn move_shares(
        &mut self,
        subject: &Subject,
        from: &Pubkey,
        to: &Pubkey,
        amount: u64,
    ) -> Result<(), StakeRewardsError> {
        self.debit(subject, from, amount)?;
        self.credit(subject, to, amount)
    }
}

impl StakeLedger for InMemoryStakeLedger {
    fn total_deposited(&self, subject: &Subject) -> u64 {
        self.shares
            .get(subject)
            .map(|holders| holders.values().fold(0u64, |acc, v| acc.saturating_add(*v)))
            .unwrap_or(0)
    }

    fn stake_of(&self, subject: &Subject, participant: &Pubkey) -> u64 {
        self.shares
            .get(subject)
            .and_then(|holders| holders.get(participant))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<(), TransferError> {
        if self.rejected.contains(recipient) {
            return Err(TransferError::RecipientRejected(*recipient));
        }
        if amount > self.vault {
            return Err(TransferError::InsufficientFunds {
                requested: amount,
                available: self.vault,
            });
        }
        self.vault = self.vault.saturating_sub(amount);
        let paid = self.paid.entry(*recipient).or_default();
        *paid = paid.saturating_add(amount);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRecord {
    pub owner: Pubkey,
    pub max_managed_stake: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InMemorySubjectRegistry {
    pools: BTreeMap<u64, PoolRecord>,
}

impl InMemorySubjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, pool_id: u64, owner: Pubkey, max_managed_stake: u64) {
        self.pools.insert(
            pool_id,
            PoolRecord {
                owner,
                max_managed_stake,
            },
        );
    }

    pub fn set_max_managed_stake(&mut self, pool_id: u64, max_managed_stake: u64) {
        if let Some(record) = self.pools.get_mut(&pool_id) {
            record.max_managed_stake = max_managed_stake;
        }
    }

    pub fn transfer_ownership(&mut self, pool_id: u64, new_owner: Pubkey) {
        if let Some(record) = self.pools.get_mut(&pool_id) {
            record.owner = new_owner;
        }
    }
}

impl SubjectRegistry for InMemorySubjectRegistry {
    fn owner_of(&self, pool_id: u64) -> Option<Pubkey> {
        self.pools.get(&pool_id).map(|r| r.owner)
    }

    fn max_managed_stake(&self, pool_id: u64) -> u64 {
        self.pools
            .get(&pool_id)
            .map(|r| r.max_managed_stake)
            .unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(now: UnixTimestamp) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Jump to `now`. Earlier timestamps are ignored.
    pub fn set(&self, now: UnixTimestamp) {
        self.now.fetch_max(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        let now = self.now().saturating_add(secs.max(0));
        self.set(now);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> UnixTimestamp {
        self.now.load(Ordering::SeqCst)
    }
}
