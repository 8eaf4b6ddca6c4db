use {
    crate::{constants::BPS_DENOMINATOR, error::StakeRewardsError},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

/// Tunables for the stake-rewards engine.
///
/// Epoch boundaries are derived from wall-clock time, not slots: reward
/// windows are long (a week by default) and the reward poster works in
/// calendar terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct StakeRewardsConfig {
    /// Length of one reward epoch in seconds.
    pub epoch_length_secs: i64,

    /// Phase offset applied before dividing timestamps into epochs.
    /// Four days shifts the Unix epoch (a Thursday) onto a Monday boundary.
    pub epoch_offset_secs: i64,

    /// Delegation fee for pools that never set one, in basis points.
    pub default_fee_bps: u16,

    /// Minimum number of seconds between two fee changes of the same pool.
    pub fee_change_cooldown_secs: i64,
}

impl Default for StakeRewardsConfig {
    fn default() -> Self {
        Self {
            epoch_length_secs: 7 * 24 * 60 * 60,          // one week
            epoch_offset_secs: 4 * 24 * 60 * 60,          // Thursday -> Monday
            default_fee_bps: 0,                           // no commission until the owner sets one
            fee_change_cooldown_secs: 2 * 7 * 24 * 60 * 60, // two epochs
        }
    }
}

/// Validate that a `StakeRewardsConfig` is internally consistent.
pub fn validate_config(config: &StakeRewardsConfig) -> Result<(), StakeRewardsError> {
    if config.epoch_length_secs <= 0 {
        return Err(StakeRewardsError::InvalidConfig {
            reason: format!(
                "epoch_length_secs must be > 0, got {}",
                config.epoch_length_secs
            ),
        });
    }
    if config.epoch_offset_secs < 0 {
        return Err(StakeRewardsError::InvalidConfig {
            reason: format!(
                "epoch_offset_secs must be >= 0, got {}",
                config.epoch_offset_secs
            ),
        });
    }
    if u64::from(config.default_fee_bps) > BPS_DENOMINATOR {
        return Err(StakeRewardsError::InvalidConfig {
            reason: format!(
                "default_fee_bps ({}) must be 0–{BPS_DENOMINATOR}",
                config.default_fee_bps
            ),
        });
    }
    if config.fee_change_cooldown_secs < 0 {
        return Err(StakeRewardsError::InvalidConfig {
            reason: "fee_change_cooldown_secs must be >= 0".to_string(),
        });
    }
    Ok(())
}
