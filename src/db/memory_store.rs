// In-process LedgerStore used for local runs and tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::error::DbError;
use crate::db::store::{AllocationFilter, AllocationUpdate, LedgerStore};
use crate::domain::lifecycle::Stage;
use crate::domain::models::{Allocation, Investor, Subscription};

#[derive(Default)]
struct Tables {
    investors: HashMap<Uuid, Investor>,
    subscriptions: HashMap<Uuid, Subscription>,
    allocations: HashMap<Uuid, Allocation>,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.investors
            .values()
            .any(|i| i.email.eq_ignore_ascii_case(email) && Some(i.id) != except)
    }
}

/// Store holding all tables behind one lock. Every method validates its
/// whole batch before mutating anything, so a failed call leaves no trace.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn unique_violation(email: &str) -> DbError {
    DbError::QueryError(format!(
        "duplicate key value violates unique constraint \"idx_investors_email\" ({})",
        email
    ))
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn insert_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&investor.email, None) {
            return Err(unique_violation(&investor.email));
        }
        tables.investors.insert(investor.id, investor.clone());
        Ok(investor)
    }

    async fn update_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.investors.contains_key(&investor.id) {
            return Err(DbError::NotFound(format!("investor {}", investor.id)));
        }
        if tables.email_taken(&investor.email, Some(investor.id)) {
            return Err(unique_violation(&investor.email));
        }
        tables.investors.insert(investor.id, investor.clone());
        Ok(investor)
    }

    async fn get_investor(&self, id: Uuid) -> Result<Option<Investor>, DbError> {
        Ok(self.tables.read().await.investors.get(&id).cloned())
    }

    async fn get_investors(&self, ids: &[Uuid]) -> Result<Vec<Investor>, DbError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.investors.get(id).cloned())
            .collect())
    }

    async fn find_investors_by_email(&self, emails: &[String]) -> Result<Vec<Investor>, DbError> {
        let tables = self.tables.read().await;
        Ok(tables
            .investors
            .values()
            .filter(|i| emails.iter().any(|e| e == &i.email))
            .cloned()
            .collect())
    }

    async fn list_investors(&self) -> Result<Vec<Investor>, DbError> {
        let tables = self.tables.read().await;
        let mut investors: Vec<Investor> = tables.investors.values().cloned().collect();
        investors.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(investors)
    }

    async fn save_investor_batch(
        &self,
        inserts: Vec<Investor>,
        updates: Vec<Investor>,
    ) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;

        for investor in &updates {
            if !tables.investors.contains_key(&investor.id) {
                return Err(DbError::NotFound(format!("investor {}", investor.id)));
            }
        }
        for (index, investor) in inserts.iter().enumerate() {
            let repeated = inserts[..index]
                .iter()
                .any(|other| other.email.eq_ignore_ascii_case(&investor.email));
            if repeated || tables.email_taken(&investor.email, None) {
                return Err(unique_violation(&investor.email));
            }
        }

        for investor in inserts.into_iter().chain(updates) {
            tables.investors.insert(investor.id, investor);
        }
        Ok(())
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription, DbError> {
        let mut tables = self.tables.write().await;
        if !tables.investors.contains_key(&subscription.investor_id) {
            return Err(DbError::QueryError(format!(
                "foreign key violation: investor {}",
                subscription.investor_id
            )));
        }
        tables
            .subscriptions
            .insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DbError> {
        Ok(self.tables.read().await.subscriptions.get(&id).cloned())
    }

    async fn get_subscriptions(&self, ids: &[Uuid]) -> Result<Vec<Subscription>, DbError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.subscriptions.get(id).cloned())
            .collect())
    }

    async fn list_subscriptions(&self, project_id: Option<Uuid>) -> Result<Vec<Subscription>, DbError> {
        let tables = self.tables.read().await;
        let mut subscriptions: Vec<Subscription> = tables
            .subscriptions
            .values()
            .filter(|s| project_id.map_or(true, |p| s.project_id == p))
            .cloned()
            .collect();
        subscriptions.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(subscriptions)
    }

    async fn confirm_subscription(&self, id: Uuid, at: DateTime<Utc>) -> Result<Subscription, DbError> {
        let mut tables = self.tables.write().await;
        let subscription = tables
            .subscriptions
            .get_mut(&id)
            .ok_or_else(|| DbError::NotFound(format!("subscription {}", id)))?;
        if !subscription.confirmed {
            subscription.confirmed = true;
            subscription.updated_at = at;
        }
        Ok(subscription.clone())
    }

    async fn create_allocations(
        &self,
        subscription_id: Uuid,
        allocations: Vec<Allocation>,
    ) -> Result<Vec<Allocation>, DbError> {
        let mut tables = self.tables.write().await;

        if !tables.subscriptions.contains_key(&subscription_id) {
            return Err(DbError::NotFound(format!("subscription {}", subscription_id)));
        }
        if let Some(duplicate) = allocations
            .iter()
            .find(|a| tables.allocations.contains_key(&a.id))
        {
            return Err(DbError::QueryError(format!(
                "duplicate key value: allocation {}",
                duplicate.id
            )));
        }

        let stamp = allocations.iter().map(|a| a.updated_at).max();
        for allocation in &allocations {
            tables.allocations.insert(allocation.id, allocation.clone());
        }
        if let Some(subscription) = tables.subscriptions.get_mut(&subscription_id) {
            subscription.allocated = true;
            subscription.updated_at = stamp.unwrap_or_else(Utc::now);
        }
        Ok(allocations)
    }

    async fn get_allocations(&self, ids: &[Uuid]) -> Result<Vec<Allocation>, DbError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.allocations.get(id).cloned())
            .collect())
    }

    async fn list_allocations(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, DbError> {
        let tables = self.tables.read().await;
        let mut allocations: Vec<Allocation> = tables
            .allocations
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        allocations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(allocations)
    }

    async fn apply_allocation_updates(
        &self,
        updates: Vec<AllocationUpdate>,
    ) -> Result<Vec<Allocation>, DbError> {
        let mut tables = self.tables.write().await;

        for update in &updates {
            let current = tables
                .allocations
                .get(&update.allocation.id)
                .ok_or_else(|| DbError::NotFound(format!("allocation {}", update.allocation.id)))?;
            if current.state.stage() != update.expected {
                return Err(DbError::Conflict(format!(
                    "allocation {} is no longer {}",
                    update.allocation.id, update.expected
                )));
            }
        }

        let mut written = Vec::with_capacity(updates.len());
        for update in updates {
            if let Some(row) = tables.allocations.get_mut(&update.allocation.id) {
                // Only lifecycle columns change
                row.state = update.allocation.state.clone();
                row.updated_at = update.allocation.updated_at;
                written.push(row.clone());
            }
        }
        Ok(written)
    }

    async fn delete_allocation(&self, id: Uuid, expected: Stage) -> Result<(), DbError> {
        let mut tables = self.tables.write().await;

        let allocation = tables
            .allocations
            .get(&id)
            .ok_or_else(|| DbError::NotFound(format!("allocation {}", id)))?;
        if allocation.state.stage() != expected {
            return Err(DbError::Conflict(format!(
                "allocation {} is no longer {}",
                id, expected
            )));
        }

        let subscription_id = allocation.subscription_id;
        tables.allocations.remove(&id);

        let remaining = tables
            .allocations
            .values()
            .any(|a| a.subscription_id == subscription_id);
        if !remaining {
            if let Some(subscription) = tables.subscriptions.get_mut(&subscription_id) {
                subscription.allocated = false;
                subscription.updated_at = Utc::now();
            }
        }
        Ok(())
    }
}
