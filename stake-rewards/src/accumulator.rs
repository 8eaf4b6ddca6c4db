//! Time-weighted stake accumulators.
//!
//! Each series is an append-only list of checkpoints. A checkpoint carries the
//! stake amount in force from its timestamp onwards together with the running
//! integral of the series (amount × seconds) up to that timestamp, so the
//! weight of any window is the difference of two integrals:
//!
//! ```text
//! integral(t) = c.accumulated + c.amount × (t − c.timestamp)
//!               where c = last checkpoint with c.timestamp ≤ t
//! weight[a, b) = integral(b) − integral(a)
//! ```

use {
    crate::{epoch::Epoch, interfaces::UnixTimestamp},
    borsh::{BorshDeserialize, BorshSerialize},
};

/// Immutable record of a stake amount change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StakeCheckpoint {
    pub timestamp: UnixTimestamp,
    /// Epoch the change happened in.
    pub epoch: Epoch,
    /// Stake in force from `timestamp` until the next checkpoint.
    pub amount: u64,
    /// Integral of the series from its first checkpoint up to `timestamp`.
    pub accumulated: u128,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CheckpointSeries {
    checkpoints: Vec<StakeCheckpoint>,
}

impl CheckpointSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the amount in force from `timestamp`.
    ///
    /// A checkpoint at the latest timestamp replaces the amount in place. An
    /// older timestamp is clamped to the latest one and appended, leaving
    /// earlier checkpoints untouched.
    pub fn record(&mut self, timestamp: UnixTimestamp, epoch: Epoch, amount: u64) {
        let Some(last) = self.checkpoints.last_mut() else {
            self.checkpoints.push(StakeCheckpoint {
                timestamp,
                epoch,
                amount,
                accumulated: 0,
            });
            return;
        };

        if timestamp == last.timestamp {
            last.amount = amount;
            return;
        }

        let timestamp = timestamp.max(last.timestamp);
        let accumulated = last.accumulated.saturating_add(held(last.amount, last.timestamp, timestamp));
        self.checkpoints.push(StakeCheckpoint {
            timestamp,
            epoch,
            amount,
            accumulated,
        });
    }

    pub fn latest(&self) -> Option<&StakeCheckpoint> {
        self.checkpoints.last()
    }

    /// Latest recorded amount, or 0 for an empty series.
    pub fn current(&self) -> u64 {
        self.latest().map(|c| c.amount).unwrap_or(0)
    }

    pub fn checkpoints(&self) -> &[StakeCheckpoint] {
        &self.checkpoints
    }

    pub fn is_empty(&self) -> bool {
        self.checkpoints.is_empty()
    }

    /// Amount in force at `timestamp`.
    pub fn amount_at(&self, timestamp: UnixTimestamp) -> u64 {
        self.checkpoint_at(timestamp).map(|c| c.amount).unwrap_or(0)
    }

    /// Integral of the series from its start up to `timestamp`.
    pub fn integral_until(&self, timestamp: UnixTimestamp) -> u128 {
        match self.checkpoint_at(timestamp) {
            Some(c) => c
                .accumulated
                .saturating_add(held(c.amount, c.timestamp, timestamp)),
            None => 0,
        }
    }

    /// Stake × seconds held over `[start, end)`.
    pub fn weight_between(&self, start: UnixTimestamp, end: UnixTimestamp) -> u128 {
        if end <= start {
            return 0;
        }
        self.integral_until(end)
            .saturating_sub(self.integral_until(start))
    }

    fn checkpoint_at(&self, timestamp: UnixTimestamp) -> Option<&StakeCheckpoint> {
        let idx = self
            .checkpoints
            .partition_point(|c| c.timestamp <= timestamp);
        idx.checked_sub(1).and_then(|i| self.checkpoints.get(i))
    }
}

#[inline]
fn held(amount: u64, from: UnixTimestamp, to: UnixTimestamp) -> u128 {
    let secs = to.saturating_sub(from).max(0) as u128;
    (amount as u128).saturating_mul(secs)
}
