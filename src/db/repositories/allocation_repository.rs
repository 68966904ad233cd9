// Repository for token allocation rows

use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::store::AllocationFilter;
use crate::db::DbError;
use crate::domain::lifecycle::{AllocationState, LifecycleFlags, Stage};
use crate::domain::models::{Allocation, TokenStandard};
use crate::entity::token_allocations::{self, Column};

#[derive(Clone, Debug)]
pub struct AllocationRepository {
    conn: DatabaseConnection,
}

impl AllocationRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Batch lookup by id (single query)
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Allocation>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = token_allocations::Entity::find()
            .filter(Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;
        models.into_iter().map(to_domain).collect()
    }

    /// Allocations matching the filter, oldest first
    pub async fn list(&self, filter: &AllocationFilter) -> Result<Vec<Allocation>, DbError> {
        let mut query = token_allocations::Entity::find();

        if let Some(project_id) = filter.project_id {
            query = query.filter(Column::ProjectId.eq(project_id));
        }
        if let Some(subscription_id) = filter.subscription_id {
            query = query.filter(Column::SubscriptionId.eq(subscription_id));
        }
        if let Some(token_type) = filter.token_type {
            query = query.filter(Column::TokenType.eq(token_type.as_str()));
        }

        let models = query
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.conn)
            .await?;
        models.into_iter().map(to_domain).collect()
    }

    /// Insert a batch in one statement
    pub async fn insert_many<C: ConnectionTrait>(
        db: &C,
        allocations: &[Allocation],
    ) -> Result<(), DbError> {
        if allocations.is_empty() {
            return Ok(());
        }

        let models: Vec<token_allocations::ActiveModel> =
            allocations.iter().map(to_active_model).collect();
        token_allocations::Entity::insert_many(models)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Writes the lifecycle columns of one row if it is still in `expected`.
    /// Returns false when no row matched.
    pub async fn update_lifecycle<C: ConnectionTrait>(
        db: &C,
        allocation: &Allocation,
        expected: Stage,
    ) -> Result<bool, DbError> {
        let flags = allocation.state.to_flags();
        let model = token_allocations::ActiveModel {
            id: NotSet,
            subscription_id: NotSet,
            investor_id: NotSet,
            project_id: NotSet,
            token_type: NotSet,
            token_amount: NotSet,
            allocation_date: Set(flags.allocation_date),
            minted: Set(flags.minted),
            minting_date: Set(flags.minting_date),
            minting_tx_hash: Set(flags.minting_tx_hash),
            distributed: Set(flags.distributed),
            distribution_date: Set(flags.distribution_date),
            distribution_tx_hash: Set(flags.distribution_tx_hash),
            notes: NotSet,
            created_at: NotSet,
            updated_at: Set(allocation.updated_at),
        };

        let result = token_allocations::Entity::update_many()
            .set(model)
            .filter(Column::Id.eq(allocation.id))
            .filter(stage_condition(expected))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    /// Deletes one row if it is still in `expected`. Returns false when no
    /// row matched.
    pub async fn delete_in_stage<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        expected: Stage,
    ) -> Result<bool, DbError> {
        let result = token_allocations::Entity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(stage_condition(expected))
            .exec(db)
            .await?;
        Ok(result.rows_affected == 1)
    }

    pub async fn find_in<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Allocation>, DbError> {
        let model = token_allocations::Entity::find_by_id(id).one(db).await?;
        model.map(to_domain).transpose()
    }

    pub async fn count_for_subscription<C: ConnectionTrait>(
        db: &C,
        subscription_id: Uuid,
    ) -> Result<u64, DbError> {
        let count = token_allocations::Entity::find()
            .filter(Column::SubscriptionId.eq(subscription_id))
            .count(db)
            .await?;
        Ok(count)
    }
}

/// SQL predicate matching rows whose flags decode to `stage`
fn stage_condition(stage: Stage) -> Condition {
    match stage {
        Stage::Pending => Condition::all()
            .add(Column::AllocationDate.is_null())
            .add(Column::Minted.eq(false))
            .add(Column::Distributed.eq(false)),
        Stage::Confirmed => Condition::all()
            .add(Column::AllocationDate.is_not_null())
            .add(Column::Minted.eq(false))
            .add(Column::Distributed.eq(false)),
        Stage::Minted => Condition::all()
            .add(Column::AllocationDate.is_not_null())
            .add(Column::Minted.eq(true))
            .add(Column::Distributed.eq(false)),
        Stage::Distributed => Condition::all()
            .add(Column::AllocationDate.is_not_null())
            .add(Column::Minted.eq(true))
            .add(Column::Distributed.eq(true)),
    }
}

fn to_active_model(allocation: &Allocation) -> token_allocations::ActiveModel {
    let flags = allocation.state.to_flags();
    token_allocations::ActiveModel {
        id: Set(allocation.id),
        subscription_id: Set(allocation.subscription_id),
        investor_id: Set(allocation.investor_id),
        project_id: Set(allocation.project_id),
        token_type: Set(allocation.token_type.as_str().to_string()),
        token_amount: Set(allocation.token_amount),
        allocation_date: Set(flags.allocation_date),
        minted: Set(flags.minted),
        minting_date: Set(flags.minting_date),
        minting_tx_hash: Set(flags.minting_tx_hash),
        distributed: Set(flags.distributed),
        distribution_date: Set(flags.distribution_date),
        distribution_tx_hash: Set(flags.distribution_tx_hash),
        notes: Set(allocation.notes.clone()),
        created_at: Set(allocation.created_at),
        updated_at: Set(allocation.updated_at),
    }
}

fn to_domain(model: token_allocations::Model) -> Result<Allocation, DbError> {
    let token_type: TokenStandard = model
        .token_type
        .parse()
        .map_err(|e| DbError::Integrity(format!("allocation {}: {}", model.id, e)))?;

    let state = AllocationState::from_flags(LifecycleFlags {
        allocation_date: model.allocation_date,
        minted: model.minted,
        minting_date: model.minting_date,
        minting_tx_hash: model.minting_tx_hash,
        distributed: model.distributed,
        distribution_date: model.distribution_date,
        distribution_tx_hash: model.distribution_tx_hash,
    })
    .map_err(|e| DbError::Integrity(format!("allocation {}: {}", model.id, e)))?;

    Ok(Allocation {
        id: model.id,
        subscription_id: model.subscription_id,
        investor_id: model.investor_id,
        project_id: model.project_id,
        token_type,
        token_amount: model.token_amount,
        state,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
