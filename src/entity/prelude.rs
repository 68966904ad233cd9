//! Prelude module for convenient imports

pub use super::investors::Entity as Investors;
pub use super::subscriptions::Entity as Subscriptions;
pub use super::token_allocations::Entity as TokenAllocations;
