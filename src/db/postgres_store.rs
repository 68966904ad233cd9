// LedgerStore backed by Postgres through sea-orm

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::db::error::DbError;
use crate::db::pool::DbPool;
use crate::db::repositories::{
    AllocationRepository, InvestorRepository, Repositories, SubscriptionFlag,
    SubscriptionRepository,
};
use crate::db::store::{AllocationFilter, AllocationUpdate, LedgerStore};
use crate::domain::lifecycle::Stage;
use crate::domain::models::{Allocation, Investor, Subscription};

/// Store that runs each operation in one database transaction
pub struct PostgresStore {
    conn: DatabaseConnection,
    repositories: Repositories,
}

impl PostgresStore {
    pub fn new(pool: &DbPool) -> Self {
        Self {
            conn: pool.get_connection().clone(),
            repositories: pool.repositories(),
        }
    }
}

#[async_trait]
impl LedgerStore for PostgresStore {
    async fn insert_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        InvestorRepository::insert(&self.conn, &investor).await?;
        Ok(investor)
    }

    async fn update_investor(&self, investor: Investor) -> Result<Investor, DbError> {
        InvestorRepository::update(&self.conn, &investor).await?;
        Ok(investor)
    }

    async fn get_investor(&self, id: Uuid) -> Result<Option<Investor>, DbError> {
        self.repositories.investor.get_by_id(id).await
    }

    async fn get_investors(&self, ids: &[Uuid]) -> Result<Vec<Investor>, DbError> {
        self.repositories.investor.get_by_ids(ids).await
    }

    async fn find_investors_by_email(&self, emails: &[String]) -> Result<Vec<Investor>, DbError> {
        self.repositories.investor.find_by_emails(emails).await
    }

    async fn list_investors(&self) -> Result<Vec<Investor>, DbError> {
        self.repositories.investor.list().await
    }

    async fn save_investor_batch(
        &self,
        inserts: Vec<Investor>,
        updates: Vec<Investor>,
    ) -> Result<(), DbError> {
        let txn = self.conn.begin().await?;

        for investor in &inserts {
            InvestorRepository::insert(&txn, investor).await?;
        }
        for investor in &updates {
            InvestorRepository::update(&txn, investor).await?;
        }

        txn.commit().await?;
        tracing::debug!(
            "Saved investor batch: {} inserted, {} updated",
            inserts.len(),
            updates.len()
        );
        Ok(())
    }

    async fn insert_subscription(&self, subscription: Subscription) -> Result<Subscription, DbError> {
        SubscriptionRepository::insert(&self.conn, &subscription).await?;
        Ok(subscription)
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>, DbError> {
        self.repositories.subscription.get_by_id(id).await
    }

    async fn get_subscriptions(&self, ids: &[Uuid]) -> Result<Vec<Subscription>, DbError> {
        self.repositories.subscription.get_by_ids(ids).await
    }

    async fn list_subscriptions(&self, project_id: Option<Uuid>) -> Result<Vec<Subscription>, DbError> {
        self.repositories.subscription.list(project_id).await
    }

    async fn confirm_subscription(&self, id: Uuid, at: DateTime<Utc>) -> Result<Subscription, DbError> {
        let txn = self.conn.begin().await?;

        let current = SubscriptionRepository::find_in(&txn, id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("subscription {}", id)))?;
        if !current.confirmed {
            SubscriptionRepository::set_flag(&txn, id, SubscriptionFlag::Confirmed, true, at)
                .await?;
        }
        let updated = SubscriptionRepository::find_in(&txn, id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("subscription {}", id)))?;

        txn.commit().await?;
        Ok(updated)
    }

    async fn create_allocations(
        &self,
        subscription_id: Uuid,
        allocations: Vec<Allocation>,
    ) -> Result<Vec<Allocation>, DbError> {
        let txn = self.conn.begin().await?;

        if SubscriptionRepository::find_in(&txn, subscription_id)
            .await?
            .is_none()
        {
            return Err(DbError::NotFound(format!("subscription {}", subscription_id)));
        }

        AllocationRepository::insert_many(&txn, &allocations).await?;
        let stamp = allocations
            .iter()
            .map(|a| a.updated_at)
            .max()
            .unwrap_or_else(Utc::now);
        SubscriptionRepository::set_flag(
            &txn,
            subscription_id,
            SubscriptionFlag::Allocated,
            true,
            stamp,
        )
        .await?;

        txn.commit().await?;
        Ok(allocations)
    }

    async fn get_allocations(&self, ids: &[Uuid]) -> Result<Vec<Allocation>, DbError> {
        self.repositories.allocation.get_by_ids(ids).await
    }

    async fn list_allocations(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, DbError> {
        self.repositories.allocation.list(filter).await
    }

    async fn apply_allocation_updates(
        &self,
        updates: Vec<AllocationUpdate>,
    ) -> Result<Vec<Allocation>, DbError> {
        let txn = self.conn.begin().await?;

        for update in &updates {
            let written =
                AllocationRepository::update_lifecycle(&txn, &update.allocation, update.expected)
                    .await?;
            if !written {
                // Dropping the transaction rolls back the rows already written
                return Err(DbError::Conflict(format!(
                    "allocation {} is no longer {}",
                    update.allocation.id, update.expected
                )));
            }
        }

        txn.commit().await?;
        Ok(updates.into_iter().map(|u| u.allocation).collect())
    }

    async fn delete_allocation(&self, id: Uuid, expected: Stage) -> Result<(), DbError> {
        let txn = self.conn.begin().await?;

        let allocation = AllocationRepository::find_in(&txn, id)
            .await?
            .ok_or_else(|| DbError::NotFound(format!("allocation {}", id)))?;

        if !AllocationRepository::delete_in_stage(&txn, id, expected).await? {
            return Err(DbError::Conflict(format!(
                "allocation {} is no longer {}",
                id, expected
            )));
        }

        let remaining =
            AllocationRepository::count_for_subscription(&txn, allocation.subscription_id).await?;
        if remaining == 0 {
            SubscriptionRepository::set_flag(
                &txn,
                allocation.subscription_id,
                SubscriptionFlag::Allocated,
                false,
                Utc::now(),
            )
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}
