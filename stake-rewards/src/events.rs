use {
    crate::{epoch::Epoch, subject::Subject},
    serde::{Deserialize, Serialize},
    solana_pubkey::Pubkey,
};

/// Notifications emitted by successful engine operations, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeRewardsEvent {
    DelegationFeeSet {
        subject: Subject,
        fee_bps: u16,
        effective_epoch: Epoch,
    },
    Rewarded {
        subject: Subject,
        epoch: Epoch,
        amount: u64,
    },
    ClaimedRewards {
        subject: Subject,
        participant: Pubkey,
        epoch: Epoch,
        amount: u64,
    },
    Slashed {
        subject: Subject,
        epoch: Epoch,
        own_loss: u64,
        delegated_loss: u64,
    },
    AllocationChanged {
        subject: Subject,
        allocated: u64,
        unallocated: u64,
        managed_stake: u64,
    },
}
