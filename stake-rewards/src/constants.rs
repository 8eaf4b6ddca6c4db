//! Shared denominators and subject type codes.

/// Basis points denominator (10_000 bps = 100%).
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Percent denominator used by slashing.
pub const PERCENT_DENOMINATOR: u64 = 100;

// ---------------------------------------------------------------------------
// Subject type codes, stable across events and snapshots.
// ---------------------------------------------------------------------------

/// Own stake of a pool operator.
pub const POOL_SUBJECT_TYPE: u8 = 2;

/// Stake delegated to a pool by third parties.
pub const DELEGATOR_SUBJECT_TYPE: u8 = 3;
