//! Persistable engine state.

use {
    crate::{
        allocator::StakeAllocator, commission::CommissionSchedule, config::StakeRewardsConfig,
        error::StakeRewardsError, ledger::RewardEpochLedger, slashing::SlashingPropagator,
    },
    borsh::{BorshDeserialize, BorshSerialize},
};

/// Everything the engine owns, excluding its collaborators and the event
/// buffer.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct LedgerSnapshot {
    pub config: StakeRewardsConfig,
    pub allocator: StakeAllocator,
    pub commission: CommissionSchedule,
    pub rewards: RewardEpochLedger,
    pub slashing: SlashingPropagator,
}

impl LedgerSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, StakeRewardsError> {
        borsh::to_vec(self).map_err(|e| StakeRewardsError::InvalidSnapshot {
            reason: e.to_string(),
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, StakeRewardsError> {
        Self::try_from_slice(bytes).map_err(|e| StakeRewardsError::InvalidSnapshot {
            reason: e.to_string(),
        })
    }
}
