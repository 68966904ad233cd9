//! Lifecycle rules for investors, subscriptions and token allocations.
//! Everything here is pure; persistence and chain calls live in `db`,
//! `chain` and `services`.

pub mod lifecycle;
pub mod minting;
pub mod models;
pub mod summary;
pub mod validation;

pub use lifecycle::{AllocationState, ChainStamp, Stage, Transition, TransitionError};
pub use models::{
    Allocation, AllocationView, Investor, KycStatus, Subscription, TokenStandard,
};
pub use summary::{SummaryStatus, TokenTypeSummary};
pub use validation::ValidationIssue;
