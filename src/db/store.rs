// Store interface the lifecycle services are written against

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::error::DbError;
use crate::domain::lifecycle::Stage;
use crate::domain::models::{Allocation, Investor, Subscription, TokenStandard};

/// Optional predicates for allocation listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationFilter {
    pub project_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
    pub token_type: Option<TokenStandard>,
}

impl AllocationFilter {
    pub fn project(project_id: Uuid) -> Self {
        Self {
            project_id: Some(project_id),
            ..Default::default()
        }
    }

    pub fn with_token_type(mut self, token_type: TokenStandard) -> Self {
        self.token_type = Some(token_type);
        self
    }

    pub fn matches(&self, allocation: &Allocation) -> bool {
        self.project_id.map_or(true, |id| allocation.project_id == id)
            && self
                .subscription_id
                .map_or(true, |id| allocation.subscription_id == id)
            && self
                .token_type
                .map_or(true, |t| allocation.token_type == t)
    }
}

/// New lifecycle state for an allocation, written only if the stored row is
/// still in `expected`
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationUpdate {
    pub expected: Stage,
    pub allocation: Allocation,
}

/// Persistent store for the ledger.
///
/// Every method is one transaction: a method either applies all of its rows
/// or none of them, and reads issued after it returns observe its writes.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn insert_investor(&self, investor: Investor) -> Result<Investor, DbError>;

    async fn update_investor(&self, investor: Investor) -> Result<Investor, DbError>;

    async fn get_investor(&self, id: Uuid) -> Result<Option<Investor>, DbError>;

    async fn get_investors(&self, ids: &[Uuid]) -> Result<Vec<Investor>, DbError>;

    async fn find_investors_by_email(&self, emails: &[String]) -> Result<Vec<Investor>, DbError>;

    async fn list_investors(&self) -> Result<Vec<Investor>, DbError>;

    /// Inserts and updates a batch of investors together
    async fn save_investor_batch(
        &self,
        inserts: Vec<Investor>,
        updates: Vec<Investor>,
    ) -> Result<(), DbError>;

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription, DbError>;

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DbError>;

    async fn get_subscriptions(&self, ids: &[Uuid]) -> Result<Vec<Subscription>, DbError>;

    async fn list_subscriptions(&self, project_id: Option<Uuid>) -> Result<Vec<Subscription>, DbError>;

    /// Sets `confirmed`; never clears it
    async fn confirm_subscription(&self, id: Uuid, at: DateTime<Utc>) -> Result<Subscription, DbError>;

    /// Inserts allocations and sets `allocated` on their subscription
    async fn create_allocations(
        &self,
        subscription_id: Uuid,
        allocations: Vec<Allocation>,
    ) -> Result<Vec<Allocation>, DbError>;

    async fn get_allocations(&self, ids: &[Uuid]) -> Result<Vec<Allocation>, DbError>;

    /// Allocations matching `filter`, oldest first
    async fn list_allocations(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, DbError>;

    /// Writes lifecycle changes; fails with `Conflict` if any row moved
    async fn apply_allocation_updates(
        &self,
        updates: Vec<AllocationUpdate>,
    ) -> Result<Vec<Allocation>, DbError>;

    /// Deletes an allocation still in `expected` and clears `allocated` on
    /// its subscription when it was the last one
    async fn delete_allocation(&self, id: Uuid, expected: Stage) -> Result<(), DbError>;
}
