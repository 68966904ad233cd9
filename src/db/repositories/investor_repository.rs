use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::db::DbError;
use crate::domain::models::{Investor, KycStatus};
use crate::entity::investors;

/// Repository for investor records
#[derive(Clone, Debug)]
pub struct InvestorRepository {
    conn: DatabaseConnection,
}

impl InvestorRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get an investor by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Investor>, DbError> {
        let model = investors::Entity::find_by_id(id).one(&self.conn).await?;
        model.map(to_domain).transpose()
    }

    /// Batch lookup by id (single query)
    pub async fn get_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Investor>, DbError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = investors::Entity::find()
            .filter(investors::Column::Id.is_in(ids.to_vec()))
            .all(&self.conn)
            .await?;
        models.into_iter().map(to_domain).collect()
    }

    /// Batch lookup by email (single query)
    pub async fn find_by_emails(&self, emails: &[String]) -> Result<Vec<Investor>, DbError> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let models = investors::Entity::find()
            .filter(investors::Column::Email.is_in(emails.to_vec()))
            .all(&self.conn)
            .await?;
        models.into_iter().map(to_domain).collect()
    }

    /// All investors, by name
    pub async fn list(&self) -> Result<Vec<Investor>, DbError> {
        let models = investors::Entity::find()
            .order_by_asc(investors::Column::Name)
            .all(&self.conn)
            .await?;
        models.into_iter().map(to_domain).collect()
    }

    /// Insert on any connection or transaction
    pub async fn insert<C: ConnectionTrait>(db: &C, investor: &Investor) -> Result<(), DbError> {
        investors::Entity::insert(to_active_model(investor))
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Full-row update on any connection or transaction
    pub async fn update<C: ConnectionTrait>(db: &C, investor: &Investor) -> Result<(), DbError> {
        to_active_model(investor).update(db).await?;
        Ok(())
    }
}

fn to_active_model(investor: &Investor) -> investors::ActiveModel {
    investors::ActiveModel {
        id: Set(investor.id),
        name: Set(investor.name.clone()),
        email: Set(investor.email.clone()),
        company: Set(investor.company.clone()),
        investor_type: Set(investor.investor_type.clone()),
        wallet_address: Set(investor.wallet_address.clone()),
        kyc_status: Set(investor.kyc_status.as_str().to_string()),
        kyc_updated_at: Set(investor.kyc_updated_at),
        notes: Set(investor.notes.clone()),
        created_at: Set(investor.created_at),
        updated_at: Set(investor.updated_at),
    }
}

fn to_domain(model: investors::Model) -> Result<Investor, DbError> {
    let kyc_status: KycStatus = model.kyc_status.parse().map_err(|e| {
        DbError::Integrity(format!("investor {} has kyc_status {}", model.id, e))
    })?;

    Ok(Investor {
        id: model.id,
        name: model.name,
        email: model.email,
        company: model.company,
        investor_type: model.investor_type,
        wallet_address: model.wallet_address,
        kyc_status,
        kyc_updated_at: model.kyc_updated_at,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
