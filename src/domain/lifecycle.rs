//! Allocation lifecycle state machine
//!
//! An allocation moves forward through four stages:
//!
//! ```text
//! Pending --confirm--> Confirmed --mint--> Minted --distribute--> Distributed
//!    ^                     |
//!    +-----unconfirm-------+
//! ```
//!
//! The persisted row keeps the flag columns (`allocation_date`, `minted`,
//! `distributed` and their stamps); [`AllocationState::from_flags`] decodes
//! them and refuses combinations no transition can produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Time and transaction hash recorded by a chain operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStamp {
    pub at: DateTime<Utc>,
    pub tx_hash: Option<String>,
}

impl ChainStamp {
    pub fn new(at: DateTime<Utc>, tx_hash: impl Into<String>) -> Self {
        Self {
            at,
            tx_hash: Some(tx_hash.into()),
        }
    }
}

/// Lifecycle state of one allocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum AllocationState {
    Pending,
    Confirmed {
        allocation_date: DateTime<Utc>,
    },
    Minted {
        allocation_date: DateTime<Utc>,
        minting: ChainStamp,
    },
    Distributed {
        allocation_date: DateTime<Utc>,
        minting: ChainStamp,
        distribution: ChainStamp,
    },
}

/// Data-free tag of an [`AllocationState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Pending,
    Confirmed,
    Minted,
    Distributed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "pending",
            Stage::Confirmed => "confirmed",
            Stage::Minted => "minted",
            Stage::Distributed => "distributed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested lifecycle change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Investor sign-off; keeps an existing allocation date
    Confirm(DateTime<Utc>),
    /// Clear the allocation date of a not yet minted allocation
    Unconfirm,
    Mint(ChainStamp),
    Distribute(ChainStamp),
}

impl Transition {
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Confirm(_) => "confirm",
            Transition::Unconfirm => "unconfirm",
            Transition::Mint(_) => "mint",
            Transition::Distribute(_) => "distribute",
        }
    }
}

/// A transition that is not allowed from the current stage
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} an allocation in stage {from}")]
pub struct TransitionError {
    pub from: Stage,
    pub action: &'static str,
}

/// Stored flag combination that no transition can produce
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("inconsistent lifecycle flags: {0}")]
pub struct FlagsError(pub &'static str);

/// Flag columns as persisted on a `token_allocations` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleFlags {
    pub allocation_date: Option<DateTime<Utc>>,
    pub minted: bool,
    pub minting_date: Option<DateTime<Utc>>,
    pub minting_tx_hash: Option<String>,
    pub distributed: bool,
    pub distribution_date: Option<DateTime<Utc>>,
    pub distribution_tx_hash: Option<String>,
}

impl AllocationState {
    pub fn stage(&self) -> Stage {
        match self {
            AllocationState::Pending => Stage::Pending,
            AllocationState::Confirmed { .. } => Stage::Confirmed,
            AllocationState::Minted { .. } => Stage::Minted,
            AllocationState::Distributed { .. } => Stage::Distributed,
        }
    }

    pub fn allocation_date(&self) -> Option<DateTime<Utc>> {
        match self {
            AllocationState::Pending => None,
            AllocationState::Confirmed { allocation_date }
            | AllocationState::Minted { allocation_date, .. }
            | AllocationState::Distributed { allocation_date, .. } => Some(*allocation_date),
        }
    }

    pub fn is_minted(&self) -> bool {
        matches!(
            self,
            AllocationState::Minted { .. } | AllocationState::Distributed { .. }
        )
    }

    pub fn is_distributed(&self) -> bool {
        matches!(self, AllocationState::Distributed { .. })
    }

    /// Rows may only be deleted before anything was minted for them
    pub fn is_deletable(&self) -> bool {
        !self.is_minted()
    }

    /// Applies `transition`, returning the next state
    pub fn apply(&self, transition: Transition) -> Result<AllocationState, TransitionError> {
        let rejected = || TransitionError {
            from: self.stage(),
            action: transition.action(),
        };

        match (self, &transition) {
            (AllocationState::Pending, Transition::Confirm(at)) => {
                Ok(AllocationState::Confirmed {
                    allocation_date: *at,
                })
            }
            (AllocationState::Confirmed { .. }, Transition::Confirm(_)) => Ok(self.clone()),
            (AllocationState::Pending, Transition::Unconfirm)
            | (AllocationState::Confirmed { .. }, Transition::Unconfirm) => {
                Ok(AllocationState::Pending)
            }
            (AllocationState::Confirmed { allocation_date }, Transition::Mint(stamp)) => {
                Ok(AllocationState::Minted {
                    allocation_date: *allocation_date,
                    minting: stamp.clone(),
                })
            }
            (
                AllocationState::Minted {
                    allocation_date,
                    minting,
                },
                Transition::Distribute(stamp),
            ) => Ok(AllocationState::Distributed {
                allocation_date: *allocation_date,
                minting: minting.clone(),
                distribution: stamp.clone(),
            }),
            _ => Err(rejected()),
        }
    }

    /// Decodes the persisted flag columns
    pub fn from_flags(flags: LifecycleFlags) -> Result<AllocationState, FlagsError> {
        let LifecycleFlags {
            allocation_date,
            minted,
            minting_date,
            minting_tx_hash,
            distributed,
            distribution_date,
            distribution_tx_hash,
        } = flags;

        if distributed && !minted {
            return Err(FlagsError("distributed without minted"));
        }

        let Some(allocation_date) = allocation_date else {
            if minted {
                return Err(FlagsError("minted without allocation_date"));
            }
            return Ok(AllocationState::Pending);
        };

        if !minted {
            return Ok(AllocationState::Confirmed { allocation_date });
        }

        // Older rows may lack a minting date; fall back to the allocation date
        let minting = ChainStamp {
            at: minting_date.unwrap_or(allocation_date),
            tx_hash: minting_tx_hash,
        };

        if !distributed {
            return Ok(AllocationState::Minted {
                allocation_date,
                minting,
            });
        }

        let distribution = ChainStamp {
            at: distribution_date.unwrap_or(minting.at),
            tx_hash: distribution_tx_hash,
        };

        Ok(AllocationState::Distributed {
            allocation_date,
            minting,
            distribution,
        })
    }

    /// Encodes the state back into flag columns
    pub fn to_flags(&self) -> LifecycleFlags {
        match self {
            AllocationState::Pending => LifecycleFlags::default(),
            AllocationState::Confirmed { allocation_date } => LifecycleFlags {
                allocation_date: Some(*allocation_date),
                ..Default::default()
            },
            AllocationState::Minted {
                allocation_date,
                minting,
            } => LifecycleFlags {
                allocation_date: Some(*allocation_date),
                minted: true,
                minting_date: Some(minting.at),
                minting_tx_hash: minting.tx_hash.clone(),
                ..Default::default()
            },
            AllocationState::Distributed {
                allocation_date,
                minting,
                distribution,
            } => LifecycleFlags {
                allocation_date: Some(*allocation_date),
                minted: true,
                minting_date: Some(minting.at),
                minting_tx_hash: minting.tx_hash.clone(),
                distributed: true,
                distribution_date: Some(distribution.at),
                distribution_tx_hash: distribution.tx_hash.clone(),
            },
        }
    }
}
