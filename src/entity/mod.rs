//! Entity module for database models

pub mod investors;
pub mod prelude;
pub mod subscriptions;
pub mod token_allocations;
