// Subscriptions entity - fiat commitments per investor and project
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,
    pub currency: String,
    #[sea_orm(column_type = "Decimal(Some((20, 2)))")]
    pub fiat_amount: Decimal,
    pub confirmed: bool,
    pub allocated: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::investors::Entity",
        from = "Column::InvestorId",
        to = "super::investors::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Investor,
    #[sea_orm(has_many = "super::token_allocations::Entity")]
    TokenAllocations,
}

impl Related<super::investors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl Related<super::token_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TokenAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
