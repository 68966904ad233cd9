//! SeaORM Entity for token_allocations table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "token_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subscription_id: Uuid,
    pub investor_id: Uuid,
    pub project_id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub token_type: String,
    #[sea_orm(column_type = "Decimal(Some((38, 8)))")]
    pub token_amount: Decimal,

    // Lifecycle flags; decoded by AllocationState::from_flags
    pub allocation_date: Option<DateTimeUtc>,
    pub minted: bool,
    pub minting_date: Option<DateTimeUtc>,
    pub minting_tx_hash: Option<String>,
    pub distributed: bool,
    pub distribution_date: Option<DateTimeUtc>,
    pub distribution_tx_hash: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subscriptions::Entity",
        from = "Column::SubscriptionId",
        to = "super::subscriptions::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Subscription,
}

impl Related<super::subscriptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscription.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
