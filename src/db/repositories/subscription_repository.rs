use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::db::DbError;
use crate::domain::models::Subscription;
use crate::entity::subscriptions;

/// Repository for subscription records
#[derive(Clone, Debug)]
pub struct SubscriptionRepository {
    conn: DatabaseConnection,
}

impl SubscriptionRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a subscription by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Subscription>, DbError> {
        Self::find_in(&self.conn, id).await
    }

    /// Lookup on any connection or transaction
    pub async fn find_in<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
    ) -> Result<Option<Subscription>, DbError> {
        let model = subscriptions::Entity::find_by_id(id).one(db).await?;
        Ok(model.map(to_domain))
    }

    /// Batch lookup by id (single query)
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Subscription>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = subscriptions::Entity::find()
            .filter(subscriptions::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    /// Subscriptions, optionally for one project, newest first
    pub async fn list(&self, project_id: Option<Uuid>) -> Result<Vec<Subscription>, DbError> {
        let mut query = subscriptions::Entity::find();

        if let Some(project_id) = project_id {
            query = query.filter(subscriptions::Column::ProjectId.eq(project_id));
        }

        let models = query
            .order_by_desc(subscriptions::Column::CreatedAt)
            .all(&self.conn)
            .await?;
        Ok(models.into_iter().map(to_domain).collect())
    }

    pub async fn insert<C: ConnectionTrait>(db: &C, subscription: &Subscription) -> Result<(), DbError> {
        let model = subscriptions::ActiveModel {
            id: Set(subscription.id),
            investor_id: Set(subscription.investor_id),
            project_id: Set(subscription.project_id),
            currency: Set(subscription.currency.clone()),
            fiat_amount: Set(subscription.fiat_amount),
            confirmed: Set(subscription.confirmed),
            allocated: Set(subscription.allocated),
            created_at: Set(subscription.created_at),
            updated_at: Set(subscription.updated_at),
        };

        subscriptions::Entity::insert(model)
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Sets one of the forward-only flags
    pub async fn set_flag<C: ConnectionTrait>(
        db: &C,
        id: Uuid,
        flag: SubscriptionFlag,
        value: bool,
        at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        let column = match flag {
            SubscriptionFlag::Confirmed => subscriptions::Column::Confirmed,
            SubscriptionFlag::Allocated => subscriptions::Column::Allocated,
        };

        let result = subscriptions::Entity::update_many()
            .col_expr(column, Expr::value(value))
            .col_expr(subscriptions::Column::UpdatedAt, Expr::value(at))
            .filter(subscriptions::Column::Id.eq(id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(DbError::NotFound(format!("subscription {}", id)));
        }
        Ok(())
    }
}

/// Boolean columns on a subscription the lifecycle writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionFlag {
    Confirmed,
    Allocated,
}

fn to_domain(model: subscriptions::Model) -> Subscription {
    Subscription {
        id: model.id,
        investor_id: model.investor_id,
        project_id: model.project_id,
        currency: model.currency,
        fiat_amount: model.fiat_amount,
        confirmed: model.confirmed,
        allocated: model.allocated,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
