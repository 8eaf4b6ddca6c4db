use crate::constants::BPS_DENOMINATOR;

/// Time-weighted stake of a pool during one epoch, in stake × seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EpochWeights {
    /// Integral of the owner's allocated stake.
    pub own: u128,
    /// Integral of the delegators' allocated stake.
    pub delegated: u128,
    /// Integral of all delegator shares, the denominator of the pro-rata split
    /// between delegators.
    pub delegator_shares: u128,
}

impl EpochWeights {
    pub fn managed(&self) -> u128 {
        self.own.saturating_add(self.delegated)
    }
}

/// How one epoch reward divides between the owner and the delegators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardSplit {
    /// Reward earned by the owner's own allocated stake.
    pub own_reward: u64,
    /// Owner's cut of the delegator-attributable reward.
    pub commission: u64,
    /// Delegator-attributable reward net of commission, shared pro-rata.
    pub delegator_pool: u64,
}

impl RewardSplit {
    pub fn owner_total(&self) -> u64 {
        self.own_reward.saturating_add(self.commission)
    }
}

/// Split an epoch reward by allocated weight and delegation fee.
///
/// # Formula
///
/// ```text
/// W          = own + delegated
/// own_reward = amount × own / W
/// N          = amount × delegated / W
/// commission = N × fee_bps / 10_000
/// pool       = N − commission
/// ```
///
/// Each stage truncates. The truncation dust is never paid out, so
/// `own_reward + commission + pool ≤ amount`.
pub fn split_reward(amount: u64, fee_bps: u16, weights: &EpochWeights) -> RewardSplit {
    let managed = weights.managed();
    if managed == 0 {
        return RewardSplit::default();
    }
    let own_reward = mul_div(amount, weights.own, managed);
    let delegated = mul_div(amount, weights.delegated, managed);
    let fee_bps = u64::from(fee_bps).min(BPS_DENOMINATOR);
    let commission = mul_div(delegated, u128::from(fee_bps), u128::from(BPS_DENOMINATOR));
    RewardSplit {
        own_reward,
        commission,
        delegator_pool: delegated.saturating_sub(commission),
    }
}

/// One delegator's share of the delegator pool.
pub fn delegator_reward(split: &RewardSplit, delegator_weight: u128, total_shares_weight: u128) -> u64 {
    if total_shares_weight == 0 {
        return 0;
    }
    mul_div(split.delegator_pool, delegator_weight.min(total_shares_weight), total_shares_weight)
}

/// `value × numerator / denominator` for fractions `≤ 1`, without overflow.
///
/// When the product does not fit in `u128` both sides of the fraction are
/// halved until it does; the relative error that introduces is far below one
/// unit of `value`.
pub fn mul_div(value: u64, numerator: u128, denominator: u128) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let value = u128::from(value);
    let (mut numerator, mut denominator) = (numerator, denominator);
    loop {
        if let Some(product) = value.checked_mul(numerator) {
            let quotient = product.checked_div(denominator).unwrap_or(0);
            return u64::try_from(quotient).unwrap_or(u64::MAX);
        }
        numerator >>= 1;
        denominator >>= 1;
    }
}
