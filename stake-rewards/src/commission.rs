//! Delegation fee schedule with deferred activation.
//!
//! A fee change requested during epoch `E` only applies from epoch `E + 1`,
//! so delegators always see a change before it affects them. Each pool keeps
//! an append-only list of `(effective_epoch, fee_bps)` entries and a fee is
//! resolved as the latest entry whose `effective_epoch` is not after the
//! queried epoch.

use {
    crate::{
        constants::BPS_DENOMINATOR, epoch::Epoch, error::StakeRewardsError,
        interfaces::UnixTimestamp,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct FeeEntry {
    pub effective_epoch: Epoch,
    pub fee_bps: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct FeeSchedule {
    entries: Vec<FeeEntry>,
    last_change: Option<UnixTimestamp>,
}

impl FeeSchedule {
    pub fn entries(&self) -> &[FeeEntry] {
        &self.entries
    }

    pub fn last_change(&self) -> Option<UnixTimestamp> {
        self.last_change
    }

    fn fee_at(&self, epoch: Epoch) -> Option<u16> {
        let idx = self
            .entries
            .partition_point(|e| e.effective_epoch <= epoch);
        idx.checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|e| e.fee_bps)
    }
}

/// Current and pending fee of a pool as seen from one epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionFee {
    pub current_fee_bps: u16,
    pub pending_fee_bps: Option<u16>,
    pub pending_since_epoch: Option<Epoch>,
    pub last_change: Option<UnixTimestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CommissionSchedule {
    default_fee_bps: u16,
    cooldown_secs: i64,
    schedules: BTreeMap<u64, FeeSchedule>,
}

impl CommissionSchedule {
    pub fn new(default_fee_bps: u16, cooldown_secs: i64) -> Self {
        Self {
            default_fee_bps,
            cooldown_secs,
            schedules: BTreeMap::new(),
        }
    }

    pub fn default_fee_bps(&self) -> u16 {
        self.default_fee_bps
    }

    /// Schedule `fee_bps` to take effect at `now_epoch + 1`.
    pub fn set_fee(
        &mut self,
        pool_id: u64,
        fee_bps: u16,
        now: UnixTimestamp,
        now_epoch: Epoch,
    ) -> Result<FeeEntry, StakeRewardsError> {
        if u64::from(fee_bps) > BPS_DENOMINATOR {
            return Err(StakeRewardsError::InvalidFeeBps { fee_bps });
        }
        let schedule = self.schedules.entry(pool_id).or_default();
        if let Some(last_change) = schedule.last_change {
            let ready_at = last_change.saturating_add(self.cooldown_secs);
            if now < ready_at {
                return Err(StakeRewardsError::FeeChangeCooldownActive {
                    last_change,
                    ready_at,
                });
            }
        }

        let entry = FeeEntry {
            effective_epoch: now_epoch.saturating_add(1),
            fee_bps,
        };
        match schedule.entries.last_mut() {
            Some(last) if last.effective_epoch >= entry.effective_epoch => {
                // Same pending window: the newer request replaces it.
                last.fee_bps = fee_bps;
            }
            _ => schedule.entries.push(entry),
        }
        schedule.last_change = Some(now);
        Ok(entry)
    }

    /// Fee in force during `epoch`.
    pub fn effective_fee(&self, pool_id: u64, epoch: Epoch) -> u16 {
        self.schedules
            .get(&pool_id)
            .and_then(|s| s.fee_at(epoch))
            .unwrap_or(self.default_fee_bps)
    }

    /// Current fee plus any change still waiting for its epoch.
    pub fn fee_state(&self, pool_id: u64, epoch: Epoch) -> CommissionFee {
        let schedule = self.schedules.get(&pool_id);
        let pending = schedule
            .and_then(|s| s.entries.last())
            .filter(|e| e.effective_epoch > epoch);
        CommissionFee {
            current_fee_bps: self.effective_fee(pool_id, epoch),
            pending_fee_bps: pending.map(|e| e.fee_bps),
            pending_since_epoch: pending.map(|e| e.effective_epoch),
            last_change: schedule.and_then(|s| s.last_change),
        }
    }

    pub fn schedule(&self, pool_id: u64) -> Option<&FeeSchedule> {
        self.schedules.get(&pool_id)
    }
}
