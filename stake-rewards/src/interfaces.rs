//! Collaborators the engine depends on but does not own.
//!
//! The token ledger, the subject registry and the wall clock live outside this
//! crate. The engine only reads share balances and ownership through these
//! traits, and pays rewards through [`StakeLedger::transfer`].

use {
    crate::{error::TransferError, subject::Subject},
    solana_pubkey::Pubkey,
    std::{
        sync::atomic::{AtomicI64, Ordering},
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// Seconds since the Unix epoch.
pub type UnixTimestamp = i64;

/// Read view of the external share ledger plus the reward payout hook.
pub trait StakeLedger {
    /// Total shares held in `subject` (all owners or all delegators of the pool).
    fn total_deposited(&self, subject: &Subject) -> u64;

    /// Shares held by `participant` in `subject`.
    fn stake_of(&self, subject: &Subject, participant: &Pubkey) -> u64;

    /// Pay `amount` reward tokens to `recipient`.
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<(), TransferError>;
}

/// Ownership and eligibility lookups for pools.
pub trait SubjectRegistry {
    fn owner_of(&self, pool_id: u64) -> Option<Pubkey>;

    /// Upper bound on `own_allocated + delegated_allocated` for the pool.
    fn max_managed_stake(&self, pool_id: u64) -> u64;
}

/// Monotonically non-decreasing time source.
pub trait Clock {
    fn now(&self) -> UnixTimestamp;
}

/// [`Clock`] backed by the operating system's real-time clock.
///
/// The wall clock may step backwards; readings never go below the highest
/// value already returned.
#[derive(Debug, Default)]
pub struct SystemClock {
    latest: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }

    fn observe(&self, wall: UnixTimestamp) -> UnixTimestamp {
        self.latest.fetch_max(wall, Ordering::SeqCst).max(wall)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> UnixTimestamp {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        self.observe(wall)
    }
}
