//! Wall-clock epoch arithmetic.
//!
//! Epochs are contiguous half-open windows `[start, end)` of fixed length,
//! shifted by a phase offset:
//!
//! ```text
//! epoch(t) = floor((t - offset) / length)
//! start(e) = offset + e * length
//! end(e)   = start(e + 1)
//! ```
//!
//! Timestamps before the offset fall into epoch 0.

use {
    crate::{config::StakeRewardsConfig, interfaces::UnixTimestamp},
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
};

pub type Epoch = u64;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct EpochClock {
    length_secs: i64,
    offset_secs: i64,
}

impl EpochClock {
    /// `length_secs` must be positive; the config validator enforces this
    /// before an engine is built.
    pub fn new(length_secs: i64, offset_secs: i64) -> Self {
        Self {
            length_secs: length_secs.max(1),
            offset_secs,
        }
    }

    pub fn from_config(config: &StakeRewardsConfig) -> Self {
        Self::new(config.epoch_length_secs, config.epoch_offset_secs)
    }

    pub fn length_secs(&self) -> i64 {
        self.length_secs
    }

    pub fn epoch_of(&self, timestamp: UnixTimestamp) -> Epoch {
        let shifted = timestamp.saturating_sub(self.offset_secs);
        if shifted <= 0 {
            return 0;
        }
        (shifted / self.length_secs) as Epoch
    }

    pub fn epoch_start(&self, epoch: Epoch) -> UnixTimestamp {
        let epoch = i64::try_from(epoch).unwrap_or(i64::MAX);
        self.offset_secs
            .saturating_add(epoch.saturating_mul(self.length_secs))
    }

    pub fn epoch_end(&self, epoch: Epoch) -> UnixTimestamp {
        self.epoch_start(epoch.saturating_add(1))
    }

    /// Seconds elapsed since the start of the epoch containing `timestamp`.
    pub fn offset_within_epoch(&self, timestamp: UnixTimestamp) -> i64 {
        timestamp.saturating_sub(self.epoch_start(self.epoch_of(timestamp)))
    }
}
