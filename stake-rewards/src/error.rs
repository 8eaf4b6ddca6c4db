use {solana_pubkey::Pubkey, thiserror::Error};

/// Errors produced by the stake-rewards engine.
///
/// Every variant describes a caller-side precondition violation. The engine
/// never retries, and a failed call leaves all state exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StakeRewardsError {
    /// Allocation request exceeds the class reserve.
    #[error("Insufficient unallocated stake: requested {requested}, unallocated {available}")]
    InsufficientUnallocatedStake { requested: u64, available: u64 },

    /// Unallocation request exceeds the class allocation.
    #[error("Insufficient allocated stake: requested {requested}, allocated {available}")]
    InsufficientAllocatedStake { requested: u64, available: u64 },

    /// Allocation would push the pool's managed stake above its threshold.
    #[error("Allocation of {requested} exceeds the pool maximum of {max} managed stake")]
    AllocationExceedsMax { requested: u64, max: u64 },

    /// A slash or withdrawal asks for more stake than the class holds.
    #[error("Insufficient stake: requested {requested}, available {available}")]
    InsufficientStake { requested: u64, available: u64 },

    /// The pool changed its delegation fee too recently.
    #[error("Delegation fee change not ready: last change at {last_change}, next allowed at {ready_at}")]
    FeeChangeCooldownActive { last_change: i64, ready_at: i64 },

    /// `reward` was already called for this (pool, epoch).
    #[error("Epoch {epoch} of pool {pool_id} already rewarded")]
    AlreadyRewarded { pool_id: u64, epoch: u64 },

    /// Rewards can only be posted once the epoch is over.
    #[error("Epoch {epoch} has not elapsed (current epoch {current_epoch})")]
    EpochNotElapsed { epoch: u64, current_epoch: u64 },

    /// A zero amount where a positive one is required.
    #[error("Zero amount: {what}")]
    ZeroAmount { what: &'static str },

    /// The participant already claimed this epoch.
    #[error("Rewards for epoch {epoch} already claimed")]
    AlreadyClaimed { epoch: u64 },

    /// The registry knows no owner for this pool.
    #[error("Unknown pool {pool_id}")]
    UnknownSubject { pool_id: u64 },

    /// Only the pool owner may perform this operation.
    #[error("Sender {sender} is not the owner of pool {pool_id}")]
    SenderNotOwner { sender: Pubkey, pool_id: u64 },

    /// Fee above 10 000 basis points.
    #[error("Invalid delegation fee: {fee_bps} bps exceeds 10000")]
    InvalidFeeBps { fee_bps: u16 },

    /// Percentage above 100.
    #[error("Invalid percentage: {percent} exceeds 100")]
    InvalidPercent { percent: u8 },

    /// Subject type code with no known meaning.
    #[error("Invalid subject type code {code}")]
    InvalidSubjectType { code: u8 },

    /// The configuration is internally inconsistent.
    #[error("Invalid stake-rewards configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A persisted snapshot could not be encoded or decoded.
    #[error("Invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    /// The external ledger refused the payout.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Arithmetic overflow in stake or reward accounting.
    #[error("Stake accounting overflow")]
    Overflow,
}

/// Errors returned by a [`crate::interfaces::StakeLedger`] payout.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Reward vault holds {available} but {requested} was requested")]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("Recipient {0} cannot receive transfers")]
    RecipientRejected(Pubkey),
}
