//! Subjects: what a unit of stake backs.

use {
    crate::{
        constants::{DELEGATOR_SUBJECT_TYPE, POOL_SUBJECT_TYPE},
        error::StakeRewardsError,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// Which side of a pool a stake belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum SubjectType {
    /// The operator's own stake.
    Pool = 2,
    /// Third-party stake delegated to the pool.
    Delegator = 3,
}

impl SubjectType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_delegator(self) -> bool {
        matches!(self, SubjectType::Delegator)
    }
}

impl TryFrom<u8> for SubjectType {
    type Error = StakeRewardsError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            POOL_SUBJECT_TYPE => Ok(SubjectType::Pool),
            DELEGATOR_SUBJECT_TYPE => Ok(SubjectType::Delegator),
            _ => Err(StakeRewardsError::InvalidSubjectType { code }),
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectType::Pool => write!(f, "pool"),
            SubjectType::Delegator => write!(f, "delegator"),
        }
    }
}

/// A `(type, id)` pair. Delegator subjects reference the pool with the same id,
/// so all per-pool state is keyed by [`Subject::pool_id`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct Subject {
    pub subject_type: SubjectType,
    pub id: u64,
}

impl Subject {
    pub fn pool(id: u64) -> Self {
        Self {
            subject_type: SubjectType::Pool,
            id,
        }
    }

    pub fn delegator(id: u64) -> Self {
        Self {
            subject_type: SubjectType::Delegator,
            id,
        }
    }

    pub fn pool_id(&self) -> u64 {
        self.id
    }

    /// The pool subject this subject's stake is managed by.
    pub fn managing_pool(&self) -> Subject {
        Subject::pool(self.id)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.subject_type, self.id)
    }
}
