//! Slashing propagation.
//!
//! A slash removes a percentage of a pool's **allocated** stake. The loss is
//! divided between the owner class and the delegator class by the delegator
//! share percentage:
//!
//! | Quantity        | Formula                                            |
//! |-----------------|----------------------------------------------------|
//! | own loss        | `own_allocated × percent × (100 − dsp) / 10_000`   |
//! | delegated loss  | `delegated_allocated × percent × dsp / 10_000`     |
//!
//! Unallocated stake is never touched, and individual delegator shares stay
//! as they are: each delegator's claim on the (now smaller) delegated stake is
//! still pro-rata to its shares.

use {
    crate::{
        allocator::AllocationState,
        constants::PERCENT_DENOMINATOR,
        epoch::Epoch,
        error::StakeRewardsError,
        interfaces::UnixTimestamp,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Losses computed for one slash, before they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlashLosses {
    pub own_loss: u64,
    pub delegated_loss: u64,
}

impl SlashLosses {
    pub fn total(&self) -> u64 {
        self.own_loss.saturating_add(self.delegated_loss)
    }
}

/// Record of an applied slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SlashEvent {
    pub pool_id: u64,
    pub epoch: Epoch,
    pub timestamp: UnixTimestamp,
    /// Share of allocated stake slashed, in percent.
    pub percent: u8,
    /// Share of the penalty carried by delegators, in percent.
    pub delegator_share_percent: u8,
    pub own_loss: u64,
    pub delegated_loss: u64,
}

// ---------------------------------------------------------------------------
// Loss computation
// ---------------------------------------------------------------------------

/// Compute the per-class losses of a slash on `state`.
///
/// A `percent` above 100 is not rejected here: it produces a loss larger than
/// the allocation, which the allocator refuses with `InsufficientStake`.
pub fn compute_losses(
    state: &AllocationState,
    percent: u8,
    delegator_share_percent: u8,
) -> Result<SlashLosses, StakeRewardsError> {
    if percent == 0 {
        return Err(StakeRewardsError::ZeroAmount {
            what: "slash percent",
        });
    }
    if u64::from(delegator_share_percent) > PERCENT_DENOMINATOR {
        return Err(StakeRewardsError::InvalidPercent {
            percent: delegator_share_percent,
        });
    }

    let percent = u128::from(percent);
    let delegator_share = u128::from(delegator_share_percent);
    let owner_share = u128::from(PERCENT_DENOMINATOR).saturating_sub(delegator_share);
    let denominator = u128::from(PERCENT_DENOMINATOR).saturating_mul(u128::from(PERCENT_DENOMINATOR));

    let loss = |allocated: u64, share: u128| -> Result<u64, StakeRewardsError> {
        let raw = u128::from(allocated)
            .saturating_mul(percent)
            .saturating_mul(share)
            .checked_div(denominator)
            .unwrap_or(0);
        u64::try_from(raw).map_err(|_| StakeRewardsError::Overflow)
    };

    Ok(SlashLosses {
        own_loss: loss(state.own_allocated, owner_share)?,
        delegated_loss: loss(state.delegated_allocated, delegator_share)?,
    })
}

// ---------------------------------------------------------------------------
// State container
// ---------------------------------------------------------------------------

/// Slash history per pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SlashingPropagator {
    history: BTreeMap<u64, Vec<SlashEvent>>,
}

impl SlashingPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: SlashEvent) {
        self.history.entry(event.pool_id).or_default().push(event);
    }

    /// Slashes applied to `pool_id`, oldest first.
    pub fn history(&self, pool_id: u64) -> &[SlashEvent] {
        self.history
            .get(&pool_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total stake removed from `pool_id` by all slashes.
    pub fn total_slashed(&self, pool_id: u64) -> u64 {
        self.history(pool_id)
            .iter()
            .fold(0u64, |acc, e| {
                acc.saturating_add(e.own_loss).saturating_add(e.delegated_loss)
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
